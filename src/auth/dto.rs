use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Missing or `null` fields become empty strings and scalars are taken as
/// their text, so the validation rules get to judge them.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => Err(D::Error::custom("expected a string")),
    }
}

/// Request body for user registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
}

/// Returned by register and login. Only the access token is handed out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub msg: String,
    pub token: String,
}

/// Public projection of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileResponse {
    pub msg: String,
    pub user: PublicUser,
}

pub const MSG_REGISTERED: &str = "Usuário registrado com sucesso";
pub const MSG_LOGGED_IN: &str = "Usuário logado com sucesso";
pub const MSG_PROFILE_LOADED: &str = "Dados obtidos com sucesso";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert!(req.password.is_empty());
        assert!(req.name.is_empty());
    }

    #[test]
    fn null_fields_deserialize_as_empty() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":null,"name":"Ana"}"#).unwrap();
        assert!(req.password.is_empty());
        assert_eq!(req.name, "Ana");
    }

    #[test]
    fn scalar_fields_are_read_as_text() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":123456}"#).unwrap();
        assert_eq!(req.password, "123456");
    }

    #[test]
    fn structured_fields_are_refused() {
        assert!(serde_json::from_str::<LoginRequest>(r#"{"email":["a@x.com"]}"#).is_err());
    }

    #[test]
    fn profile_response_has_no_secret_fields() {
        let response = ProfileResponse {
            msg: MSG_PROFILE_LOADED.into(),
            user: PublicUser {
                name: "Ana".into(),
                email: "a@x.com".into(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        let user = json["user"].as_object().unwrap();
        assert_eq!(user.len(), 2);
        assert_eq!(user["name"], "Ana");
        assert_eq!(user["email"], "a@x.com");
    }
}
