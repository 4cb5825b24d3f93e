//! Input shape gates run before any flow touches the store.
//!
//! Rules are ordered `(field, predicate, message)` triples. Every rule is
//! evaluated, so a caller gets the full list of violations in one response.
use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    auth::dto::{LoginRequest, RegisterRequest},
    error::{AuthError, AuthResult, FieldError},
};

pub const MIN_PASSWORD_CHARS: usize = 6;
/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;
const MSG_PASSWORD_TOO_LONG: &str = "A senha deve ter no máximo 72 bytes";

pub struct Rule<T> {
    pub field: &'static str,
    pub check: fn(&T) -> bool,
    pub message: &'static str,
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

fn short_enough(password: &str) -> bool {
    password.len() <= MAX_PASSWORD_BYTES
}

pub const REGISTER_RULES: &[Rule<RegisterRequest>] = &[
    Rule {
        field: "name",
        check: |r| !r.name.is_empty(),
        message: "Nome não pode ser vazio",
    },
    Rule {
        field: "email",
        check: |r| is_valid_email(&r.email),
        message: "E-mail deve ser válido",
    },
    Rule {
        field: "email",
        check: |r| !r.email.is_empty(),
        message: "E-mail não pode ser vazio",
    },
    Rule {
        field: "password",
        check: |r| long_enough(&r.password),
        message: "A senha deve ter no mínimo 6 caracteres",
    },
    Rule {
        field: "password",
        check: |r| short_enough(&r.password),
        message: MSG_PASSWORD_TOO_LONG,
    },
    Rule {
        field: "password",
        check: |r| !r.password.is_empty(),
        message: "Senha é obrigatória",
    },
];

pub const LOGIN_RULES: &[Rule<LoginRequest>] = &[
    Rule {
        field: "email",
        check: |r| is_valid_email(&r.email),
        message: "E-mail deve ser válido",
    },
    Rule {
        field: "email",
        check: |r| !r.email.is_empty(),
        message: "E-mail é obrigatório",
    },
    Rule {
        field: "password",
        check: |r| long_enough(&r.password),
        message: "A senha deve ter no mínimo 6 caracteres",
    },
    Rule {
        field: "password",
        check: |r| short_enough(&r.password),
        message: MSG_PASSWORD_TOO_LONG,
    },
    Rule {
        field: "password",
        check: |r| !r.password.is_empty(),
        message: "Senha é obrigatória",
    },
];

/// Evaluates all rules in order and collects every violation.
pub fn evaluate<T>(input: &T, rules: &[Rule<T>]) -> Vec<FieldError> {
    rules
        .iter()
        .filter(|rule| !(rule.check)(input))
        .map(|rule| FieldError {
            field: rule.field,
            msg: rule.message,
        })
        .collect()
}

pub trait Validate: Sized + 'static {
    const RULES: &'static [Rule<Self>];

    fn validate(&self) -> AuthResult<()> {
        let errors = evaluate(self, Self::RULES);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::ValidationFailed(errors))
        }
    }
}

impl Validate for RegisterRequest {
    const RULES: &'static [Rule<Self>] = REGISTER_RULES;
}

impl Validate for LoginRequest {
    const RULES: &'static [Rule<Self>] = LOGIN_RULES;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }

    fn messages(err: AuthError) -> Vec<(&'static str, &'static str)> {
        match err {
            AuthError::ValidationFailed(v) => v.into_iter().map(|e| (e.field, e.msg)).collect(),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("ax.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn valid_register_passes() {
        assert!(register("a@x.com", "secret1", "Ana").validate().is_ok());
    }

    #[test]
    fn empty_register_reports_every_rule_in_order() {
        let errs = messages(register("", "", "").validate().unwrap_err());
        assert_eq!(
            errs,
            vec![
                ("name", "Nome não pode ser vazio"),
                ("email", "E-mail deve ser válido"),
                ("email", "E-mail não pode ser vazio"),
                ("password", "A senha deve ter no mínimo 6 caracteres"),
                ("password", "Senha é obrigatória"),
            ]
        );
    }

    #[test]
    fn short_passwords_are_rejected() {
        for pw in ["a", "ab", "abc", "abcd", "abcde"] {
            let errs = messages(register("a@x.com", pw, "Ana").validate().unwrap_err());
            assert_eq!(errs, vec![("password", "A senha deve ter no mínimo 6 caracteres")]);
        }
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        // six characters, eleven bytes
        assert!(register("a@x.com", "ááááá1", "Ana").validate().is_ok());
        assert!(register("a@x.com", "çççç1", "Ana").validate().is_err());
    }

    #[test]
    fn passwords_past_the_bcrypt_limit_are_rejected() {
        let at_limit = "a".repeat(72);
        assert!(register("a@x.com", &at_limit, "Ana").validate().is_ok());

        let over = format!("{at_limit}X");
        let errs = messages(register("a@x.com", &over, "Ana").validate().unwrap_err());
        assert_eq!(errs, vec![("password", "A senha deve ter no máximo 72 bytes")]);

        let login = LoginRequest {
            email: "a@x.com".into(),
            password: over,
        };
        let errs = messages(login.validate().unwrap_err());
        assert_eq!(errs, vec![("password", "A senha deve ter no máximo 72 bytes")]);
    }

    #[test]
    fn byte_limit_counts_bytes_not_characters() {
        // 37 characters, 73 bytes
        let pw = format!("{}a", "á".repeat(36));
        assert!(register("a@x.com", &pw, "Ana").validate().is_err());
    }

    #[test]
    fn email_is_not_normalized() {
        assert!(register(" a@x.com", "secret1", "Ana").validate().is_err());
    }

    #[test]
    fn login_uses_its_own_messages() {
        let errs = messages(
            LoginRequest {
                email: String::new(),
                password: "secret1".into(),
            }
            .validate()
            .unwrap_err(),
        );
        assert_eq!(
            errs,
            vec![("email", "E-mail deve ser válido"), ("email", "E-mail é obrigatório")]
        );
    }
}
