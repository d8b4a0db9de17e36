pub mod params;
pub mod trial;
pub mod results;
pub mod errors;

pub use params::*;
pub use trial::*;
pub use results::*;
pub use errors::*;
