//! Helper functions for argument extraction

use blas_core::{BlasError, Density, Matrix, Operands, Value};

/// Extract a Number from a Value
pub fn extract_number(value: &Value, action: &str, arg: &str) -> Result<f64, BlasError> {
    value
        .as_number()
        .ok_or_else(|| BlasError::arg_type(action, arg, "Number", value.type_name()))
}

/// Extract a non-negative integer from a Value
pub fn extract_usize(value: &Value, action: &str, arg: &str) -> Result<usize, BlasError> {
    let n = extract_number(value, action, arg)?;
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(BlasError::domain_error(format!(
            "{}: {} must be a non-negative integer, got {}", action, arg, n
        )));
    }
    Ok(n as usize)
}

/// Extract a count, truncating any fractional part toward zero
pub fn extract_count(value: &Value, action: &str, arg: &str) -> Result<usize, BlasError> {
    let n = extract_number(value, action, arg)?;
    if n < 0.0 || !n.is_finite() {
        return Err(BlasError::domain_error(format!(
            "{}: {} must be a non-negative number, got {}", action, arg, n
        )));
    }
    Ok(n.trunc() as usize)
}

/// Extract a Text from a Value
pub fn extract_text<'v>(value: &'v Value, action: &str, arg: &str) -> Result<&'v str, BlasError> {
    value
        .as_text()
        .ok_or_else(|| BlasError::arg_type(action, arg, "Text", value.type_name()))
}

/// Extract a Matrix from a Value
pub fn extract_matrix<'v>(value: &'v Value, action: &str, arg: &str) -> Result<&'v Matrix, BlasError> {
    value
        .as_matrix()
        .ok_or_else(|| BlasError::arg_type(action, arg, "Matrix", value.type_name()))
}

/// Extract a (possibly nested) list of Numbers from a Value
pub fn extract_number_list(value: &Value, action: &str, arg: &str) -> Result<Vec<f64>, BlasError> {
    let items = value
        .as_list()
        .ok_or_else(|| BlasError::arg_type(action, arg, "List", value.type_name()))?;
    Operands::flatten(items)
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_number().ok_or_else(|| BlasError::domain_error(format!(
                "{}: {} element {} must be a Number, got {}", action, arg, i, item.type_name()
            )))
        })
        .collect()
}

/// Split a trailing density selector off unflattened arguments
pub fn split_density(args: &[Value]) -> (&[Value], Density) {
    match args.split_last() {
        Some((Value::Text(t), rest)) => match Density::parse(t) {
            Some(density) => (rest, density),
            None => (args, Density::default()),
        },
        _ => (args, Density::default()),
    }
}

/// Check that a matrix is square
pub fn check_square(m: &Matrix, action: &str) -> Result<(), BlasError> {
    if !m.is_square() {
        return Err(BlasError::domain_error(format!(
            "{}: requires square matrix, got {}×{}", action, m.rows(), m.cols()
        )));
    }
    Ok(())
}

/// Check that every stored entry of a matrix is finite
pub fn check_finite(m: &Matrix, action: &str) -> Result<(), BlasError> {
    if m.dense().iter().any(|x| !x.is_finite()) {
        return Err(BlasError::domain_error(format!(
            "{}: matrix contains non-finite entries", action
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blas_core::codes;

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number(&Value::from(42.0), "test", "x").unwrap(), 42.0);
        let err = extract_number(&Value::from("x"), "test", "x").unwrap_err();
        assert_eq!(err.code, codes::ARG_TYPE);
    }

    #[test]
    fn test_extract_usize_rejects_fractions() {
        assert_eq!(extract_usize(&Value::from(5.0), "test", "k").unwrap(), 5);
        assert!(extract_usize(&Value::from(2.5), "test", "k").is_err());
        assert!(extract_usize(&Value::from(-1.0), "test", "k").is_err());
    }

    #[test]
    fn test_extract_count_truncates() {
        assert_eq!(extract_count(&Value::from(5.5), "test", "k").unwrap(), 5);
        assert_eq!(extract_count(&Value::from(0.9), "test", "k").unwrap(), 0);
        assert!(extract_count(&Value::from(-1.0), "test", "k").is_err());
        assert!(extract_count(&Value::from(f64::INFINITY), "test", "k").is_err());
    }

    #[test]
    fn test_extract_number_list() {
        let val = Value::List(vec![Value::from(1.0), Value::List(vec![Value::from(2.0)]), Value::from(3.0)]);
        assert_eq!(extract_number_list(&val, "test", "x").unwrap(), vec![1.0, 2.0, 3.0]);
        let bad = Value::List(vec![Value::from(1.0), Value::from("a")]);
        assert!(extract_number_list(&bad, "test", "x").is_err());
    }

    #[test]
    fn test_check_finite() {
        let m = Matrix::from_rows(&[vec![1.0, f64::NAN]], Density::Sparse).unwrap();
        let err = check_finite(&m, "test").unwrap_err();
        assert_eq!(err.code, codes::DOMAIN_ERROR);
        assert!(err.message.contains("non-finite"));
        let m = Matrix::from_rows(&[vec![1.0, 0.0]], Density::Dense).unwrap();
        assert!(check_finite(&m, "test").is_ok());
    }

    #[test]
    fn test_split_density() {
        let args = vec![Value::List(vec![]), Value::from("sparse")];
        let (rest, density) = split_density(&args);
        assert_eq!(rest.len(), 1);
        assert_eq!(density, Density::Sparse);

        let args = vec![Value::List(vec![]), Value::from("Sparse")];
        assert_eq!(split_density(&args).0.len(), 2);
    }
}
