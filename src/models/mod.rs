pub mod candidate;
pub mod report;
pub mod review;
pub mod state;
pub mod website;

pub use candidate::*;
pub use report::*;
pub use review::*;
pub use state::*;
pub use website::*;
