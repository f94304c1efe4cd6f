pub mod checkout;
pub mod kvlm;
pub mod objects;
pub mod repo;
pub mod tree;
