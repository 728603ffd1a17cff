mod integration_tests;
mod text_tests;
