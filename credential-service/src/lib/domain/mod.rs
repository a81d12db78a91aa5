pub mod credential;
pub mod subject;

#[cfg(test)]
pub(crate) mod mocks;
