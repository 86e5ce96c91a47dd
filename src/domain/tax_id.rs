//! Brazilian tax identifiers (CNPJ / CPF) used as company identifiers.

use crate::errors::{AppError, AppResult};

const CNPJ_LEN: usize = 14;
const CPF_LEN: usize = 11;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Kind of tax identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    Cnpj,
    Cpf,
}

/// Normalize a tax identifier to its digits and verify the check digits.
///
/// Accepts punctuated input such as `11.222.333/0001-81`.
pub fn normalize_tax_id(input: &str) -> AppResult<(String, TaxIdKind)> {
    let digits: Vec<u32> = input
        .chars()
        .filter(|c| !matches!(c, '.' | '/' | '-' | ' '))
        .map(|c| {
            c.to_digit(10)
                .ok_or_else(|| AppError::validation("Identifier must contain only digits"))
        })
        .collect::<AppResult<_>>()?;

    let kind = match digits.len() {
        CNPJ_LEN => TaxIdKind::Cnpj,
        CPF_LEN => TaxIdKind::Cpf,
        _ => {
            return Err(AppError::validation(
                "Identifier must be a CNPJ (14 digits) or CPF (11 digits)",
            ))
        }
    };

    if digits.iter().all(|d| *d == digits[0]) {
        return Err(AppError::validation("Identifier is not valid"));
    }

    let valid = match kind {
        TaxIdKind::Cnpj => {
            check_digit(&digits[..12], &CNPJ_FIRST_WEIGHTS) == digits[12]
                && check_digit(&digits[..13], &CNPJ_SECOND_WEIGHTS) == digits[13]
        }
        TaxIdKind::Cpf => {
            check_digit(&digits[..9], &CPF_FIRST_WEIGHTS) == digits[9]
                && check_digit(&digits[..10], &CPF_SECOND_WEIGHTS) == digits[10]
        }
    };

    if !valid {
        return Err(AppError::validation("Identifier check digits do not match"));
    }

    let normalized = digits
        .iter()
        .filter_map(|d| char::from_digit(*d, 10))
        .collect();
    Ok((normalized, kind))
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cnpj_punctuated_and_plain() {
        let (id, kind) = normalize_tax_id("11.222.333/0001-81").unwrap();
        assert_eq!(id, "11222333000181");
        assert_eq!(kind, TaxIdKind::Cnpj);
        assert_eq!(normalize_tax_id("11222333000181").unwrap().0, id);
    }

    #[test]
    fn test_valid_cpf() {
        let (id, kind) = normalize_tax_id("529.982.247-25").unwrap();
        assert_eq!(id, "52998224725");
        assert_eq!(kind, TaxIdKind::Cpf);
    }

    #[test]
    fn test_wrong_check_digits() {
        assert!(normalize_tax_id("11.222.333/0001-82").is_err());
        assert!(normalize_tax_id("529.982.247-26").is_err());
    }

    #[test]
    fn test_repeated_digits_rejected() {
        assert!(normalize_tax_id("00000000000000").is_err());
        assert!(normalize_tax_id("111.111.111-11").is_err());
    }

    #[test]
    fn test_wrong_length_or_letters() {
        assert!(normalize_tax_id("1234").is_err());
        assert!(normalize_tax_id("11.222.333/0001-8A").is_err());
    }
}
