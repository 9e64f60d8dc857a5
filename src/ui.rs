/// Print `body` inside a rounded box, with an optional title in the top edge.
pub fn panel(title: Option<&str>, body: &str) {
    for line in render_panel(title, body) {
        println!("{line}");
    }
}

pub fn render_panel(title: Option<&str>, body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.lines().collect();
    let title_width = title.map_or(0, |t| t.chars().count() + 2);
    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(title_width)
        + 2;

    let mut out = Vec::with_capacity(lines.len() + 2);
    match title {
        Some(title) => {
            let rest = inner - title_width;
            let left = rest / 2;
            out.push(format!(
                "╭{} {title} {}╮",
                "─".repeat(left),
                "─".repeat(rest - left)
            ));
        }
        None => out.push(format!("╭{}╮", "─".repeat(inner))),
    }
    for line in lines {
        let pad = inner - 2 - line.chars().count();
        out.push(format!("│ {line}{} │", " ".repeat(pad)));
    }
    out.push(format!("╰{}╯", "─".repeat(inner)));
    out
}

pub fn heading(text: &str) {
    println!();
    println!("{text}");
}

pub fn warning(text: &str) {
    println!();
    println!("⚠️  {text}");
}

pub fn error(text: &str) {
    eprintln!("❌ {text}");
}
