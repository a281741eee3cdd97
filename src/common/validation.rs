// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

// ---
// Validações customizadas usadas pelos payloads (validator::custom)
// ---

/// Maior valor aceito para preço, custo ou quantidade (cabe em NUMERIC(18,4)
/// e deixa folga para produtos e somas sem estourar o Decimal).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0); // 1e12

fn too_large() -> ValidationError {
    let mut err = ValidationError::new("range");
    err.add_param("max".into(), &1e12);
    err.message = Some("O valor não pode passar de 1.000.000.000.000.".into());
    err
}

pub fn validate_max_amount(val: &Decimal) -> Result<(), ValidationError> {
    if val.abs() > MAX_AMOUNT {
        return Err(too_large());
    }
    Ok(())
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    validate_max_amount(val)?;
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    validate_max_amount(val)?;
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusiveMin".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

/// Percentuais são frações (0.20 = 20%). Aceitamos de 0 a 10 (1000%).
pub fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if (val.is_sign_negative() && !val.is_zero()) || *val > Decimal::TEN {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &10.0);
        err.message = Some("O percentual deve estar entre 0 e 10 (fração).".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn not_negative_accepts_zero_and_rejects_negative() {
        assert!(validate_not_negative(&d("0")).is_ok());
        assert!(validate_not_negative(&d("-0.00")).is_ok());
        assert!(validate_not_negative(&d("12.5")).is_ok());
        assert!(validate_not_negative(&d("-1")).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(validate_positive(&d("0")).is_err());
        assert!(validate_positive(&d("0.01")).is_ok());
    }

    #[test]
    fn amounts_above_the_limit_are_rejected() {
        assert_eq!(MAX_AMOUNT, d("1000000000000"));
        assert!(validate_positive(&d("1000000000000")).is_ok());
        assert!(validate_positive(&d("1000000000000.01")).is_err());
        assert!(validate_not_negative(&d("1000000000000000")).is_err());
        assert!(validate_max_amount(&d("-1000000000001")).is_err());
    }

    #[test]
    fn percentage_range() {
        assert!(validate_percentage(&d("0.2")).is_ok());
        assert!(validate_percentage(&d("-0.1")).is_err());
        assert!(validate_percentage(&d("11")).is_err());
    }
}
