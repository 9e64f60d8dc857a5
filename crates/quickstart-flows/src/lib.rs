pub mod contributors;
pub mod quickstart;
pub mod toolchain;

pub use contributors::{ContributorOptions, ContributorSetupFlow};
pub use quickstart::{QuickstartFlow, QuickstartOptions};
pub use toolchain::{ProcessContributor, ProcessQuickstart};
