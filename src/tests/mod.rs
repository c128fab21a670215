mod support;

mod catalog_tests;
mod scheduler_tests;
