// ordermart/src/commands/mod.rs

pub mod clean;
pub mod inspect;
pub mod run;
pub mod validate;

use ordermart_core::OrdermartError;

/// A data check rejected the input.
pub const EXIT_DATA_FAILURE: i32 = 1;
/// IO, config or sink trouble: the data itself was never judged.
pub const EXIT_ENVIRONMENT_FAILURE: i32 = 2;

pub fn exit_code(err: &OrdermartError) -> i32 {
    if err.is_data_failure() {
        EXIT_DATA_FAILURE
    } else {
        EXIT_ENVIRONMENT_FAILURE
    }
}

/// Print a failed run the way operators read it: which check, which table,
/// then the miette diagnostic when there is one. Returns the exit code.
pub fn report_failure(headline: &str, err: OrdermartError) -> i32 {
    let code = exit_code(&err);
    eprintln!("\n{}: {}", headline, err);
    if let OrdermartError::Domain(domain) = err {
        eprintln!("   Failed check: {}", domain.check_name());
        eprintln!("{:?}", miette::Report::new(domain));
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordermart_core::domain::DomainError;

    #[test]
    fn test_exit_code_separates_data_from_environment() {
        let data = OrdermartError::Domain(DomainError::EmptyDatasetError {
            table: "users".into(),
        });
        let env = OrdermartError::InternalError("disk full".into());

        assert_eq!(exit_code(&data), EXIT_DATA_FAILURE);
        assert_eq!(exit_code(&env), EXIT_ENVIRONMENT_FAILURE);
    }
}
