// src/common/money.rs
//
// Somas de valores sem pânico: os payloads já limitam cada valor, mas o
// estado importado ou antigo pode trazer qualquer coisa.

use rust_decimal::Decimal;

/// Soma que satura em `Decimal::MAX`/`MIN` em vez de estourar.
pub fn sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_saturates_instead_of_panicking() {
        assert_eq!(sum([Decimal::new(15, 1), Decimal::ONE]), Decimal::new(25, 1));
        assert_eq!(sum([Decimal::MAX, Decimal::MAX]), Decimal::MAX);
        assert_eq!(sum(Vec::<Decimal>::new()), Decimal::ZERO);
    }
}
