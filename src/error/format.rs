use crate::error::{ErrorContext, InstillError};

pub fn format_error_chain(error: &InstillError) -> String {
    let context = ErrorContext::new(error);
    context.to_string()
}
