pub mod build;
pub mod check;
pub mod flatten;
pub mod thread_ops;

#[cfg(test)]
pub(crate) mod test_helpers;
