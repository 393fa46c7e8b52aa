pub mod compile;
pub mod inspect;
pub mod load;
pub mod resolve;
pub mod sets;
