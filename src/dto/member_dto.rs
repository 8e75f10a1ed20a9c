use crate::error::{QueryError, Result};
use crate::projection::{decode_value, Bean};
use crate::query_projection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Username and age of a member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub username: Option<String>,
    pub age: i32,
}

impl MemberDto {
    pub fn new(username: Option<String>, age: i32) -> Self {
        Self { username, age }
    }
}

impl Bean for MemberDto {
    fn set(&mut self, property: &str, value: Value) -> Result<()> {
        match property {
            "username" => self.username = decode_value(property, value)?,
            "age" => {
                let age: i32 = decode_value(property, value)?;
                if age < 0 {
                    return Err(QueryError::projection(format!("age must not be negative, got {age}")));
                }
                self.age = age;
            }
            other => {
                return Err(QueryError::projection(format!(
                    "MemberDto has no property '{other}'"
                )))
            }
        }
        Ok(())
    }
}

query_projection!(MemberDto::new(username: Option<String>, age: i32));
