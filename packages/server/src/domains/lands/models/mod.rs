pub mod carbon_credit;
pub mod land;
pub mod seller;

pub use carbon_credit::{CarbonCredit, CreateCarbonCredit};
pub use land::{Land, LandInput};
pub use seller::{Seller, User, VerificationStatus};
