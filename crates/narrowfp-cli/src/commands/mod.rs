pub mod codec;
pub mod compare;
pub mod limits;
pub mod run;
pub mod validate;
