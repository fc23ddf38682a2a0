//! Bitrix24 CRM directory adapter.
//!
//! Backs the birthday digest with two webhook endpoints: `user.get` for
//! employees and `crm.contact.list` for clients. Both are paged; the
//! client follows the `next` cursor until the server stops returning one.
//!
//! Birthday matching happens client-side: Bitrix date filters are awkward
//! across year boundaries, so the adapter pulls candidates and compares
//! month and day of the parsed birth date.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use opspulse_core::CrmDirectory;
use opspulse_domain::{BirthdayPerson, BitrixConfig, OpsPulseError, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::http::HttpClient;

/// One page of a Bitrix REST response.
#[derive(Debug, Deserialize)]
struct BitrixPage {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    next: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct BitrixClient {
    http: HttpClient,
    contact_url: Option<String>,
    users_url: Option<String>,
}

impl BitrixClient {
    pub fn new(http: HttpClient, config: &BitrixConfig) -> Self {
        Self {
            http,
            contact_url: config.contact_url.clone(),
            users_url: config.users_url.clone(),
        }
    }

    /// Fetch every page of a Bitrix list method.
    async fn paged_get(&self, url: &str, mut params: Value) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut start: Option<u64> = None;

        loop {
            if let (Some(cursor), Some(map)) = (start, params.as_object_mut()) {
                map.insert("start".to_string(), json!(cursor));
            }

            let request = self.http.request(Method::POST, url).json(&params);
            let response = self.http.send(request).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(OpsPulseError::Network(format!(
                    "Bitrix endpoint returned HTTP {status}"
                )));
            }
            let page: BitrixPage = response
                .json()
                .await
                .map_err(|e| OpsPulseError::Source(format!("invalid Bitrix payload: {e}")))?;

            if let Some(code) = page.error {
                let description = page.error_description.unwrap_or_default();
                return Err(OpsPulseError::Network(format!(
                    "Bitrix error {code}: {description}"
                )));
            }

            // `result` is either a bare array or `{"items": [...]}`.
            match page.result {
                Value::Array(batch) => items.extend(batch),
                Value::Object(mut obj) => {
                    if let Some(Value::Array(batch)) = obj.remove("items") {
                        items.extend(batch);
                    }
                }
                _ => {}
            }

            match page.next {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        debug!(url, count = items.len(), "fetched Bitrix pages");
        Ok(items)
    }
}

#[async_trait]
impl CrmDirectory for BitrixClient {
    async fn employees_with_birthday(&self, month: u32, day: u32) -> Result<Vec<BirthdayPerson>> {
        let Some(url) = self.users_url.as_deref() else {
            warn!("Bitrix users endpoint not configured, skipping employee birthdays");
            return Ok(Vec::new());
        };

        let params = json!({
            "SELECT": ["ID", "NAME", "LAST_NAME", "PERSONAL_BIRTHDAY", "ACTIVE"],
        });
        let users = self.paged_get(url, params).await?;

        let mut people: Vec<BirthdayPerson> = users
            .iter()
            .filter(|user| is_active(user.get("ACTIVE")))
            .filter(|user| {
                field_str(user, "PERSONAL_BIRTHDAY")
                    .and_then(parse_birthday)
                    .is_some_and(|date| date.month() == month && date.day() == day)
            })
            .map(|user| BirthdayPerson {
                id: field_str(user, "ID").unwrap_or_default().to_string(),
                name: full_name(user),
                phones: Vec::new(),
            })
            .collect();

        people.sort_by_key(|person| person.name.to_lowercase());
        Ok(people)
    }

    async fn clients_with_birthday(&self, month: u32, day: u32) -> Result<Vec<BirthdayPerson>> {
        let Some(url) = self.contact_url.as_deref() else {
            warn!("Bitrix contact endpoint not configured, skipping client birthdays");
            return Ok(Vec::new());
        };

        let params = json!({
            "filter": {"!BIRTHDATE": ""},
            "select": ["ID", "NAME", "LAST_NAME", "BIRTHDATE", "PHONE"],
        });
        let contacts = self.paged_get(url, params).await?;

        let mut people: Vec<BirthdayPerson> = contacts
            .iter()
            .filter(|contact| {
                field_str(contact, "BIRTHDATE")
                    .and_then(parse_birthday)
                    .is_some_and(|date| date.month() == month && date.day() == day)
            })
            .map(|contact| BirthdayPerson {
                id: field_str(contact, "ID").unwrap_or_default().to_string(),
                name: full_name(contact),
                phones: contact_phones(contact),
            })
            .collect();

        people.sort_by_key(|person| person.name.to_lowercase());
        Ok(people)
    }
}

fn field_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

fn is_active(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.to_uppercase().as_str(), "Y" | "TRUE" | "1"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// Parse a Bitrix date field. Values arrive as `2024-06-10T03:00:00+03:00`
/// or a bare date; only the date part matters.
fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn full_name(item: &Value) -> String {
    let first = field_str(item, "NAME").unwrap_or_default();
    let last = field_str(item, "LAST_NAME").unwrap_or_default();
    let name = format!("{first} {last}").trim().to_string();
    if name.is_empty() {
        "Без імені".to_string()
    } else {
        name
    }
}

/// Extract and normalize contact phones, deduplicated by digits in
/// encounter order.
fn contact_phones(contact: &Value) -> Vec<String> {
    let Some(entries) = contact.get("PHONE").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = Vec::new();
    let mut phones = Vec::new();
    for entry in entries {
        let raw = entry.get("VALUE").and_then(Value::as_str).unwrap_or_default();
        let normalized = normalize_phone(raw);
        if normalized.is_empty() {
            continue;
        }
        let digits = clean_phone(&normalized);
        if seen.contains(&digits) {
            continue;
        }
        seen.push(digits);
        phones.push(normalized);
    }
    phones
}

/// Strip everything but digits.
fn clean_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize a Ukrainian phone number to `+380XXXXXXXXX` form.
///
/// Local numbers starting with `0` get the country code prefixed; numbers
/// already carrying `380` keep it. Anything without digits maps to empty.
fn normalize_phone(raw: &str) -> String {
    let digits = clean_phone(raw);
    if digits.is_empty() {
        return String::new();
    }

    let canonical = if let Some(local) = digits.strip_prefix('0') {
        format!("380{local}")
    } else if digits.starts_with("380") {
        digits
    } else {
        format!("380{digits}")
    };

    format!("+{canonical}")
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn normalizes_local_numbers() {
        assert_eq!(normalize_phone("050 111-22-33"), "+380501112233");
        assert_eq!(normalize_phone("380501112233"), "+380501112233");
        assert_eq!(normalize_phone("+38 (050) 111 22 33"), "+380501112233");
        assert_eq!(normalize_phone("501112233"), "+380501112233");
        assert_eq!(normalize_phone("---"), "");
    }

    #[test]
    fn keeps_digits_inside_numbers_starting_with_380() {
        // A number whose local part also begins with 380 keeps every digit.
        assert_eq!(normalize_phone("3803801234"), "+3803801234");
    }

    #[test]
    fn parses_birthdays_with_and_without_time() {
        assert_eq!(
            parse_birthday("1990-06-10T03:00:00+03:00"),
            NaiveDate::from_ymd_opt(1990, 6, 10)
        );
        assert_eq!(parse_birthday("1990-06-10"), NaiveDate::from_ymd_opt(1990, 6, 10));
        assert_eq!(parse_birthday("not a date"), None);
        assert_eq!(parse_birthday(""), None);
    }

    #[test]
    fn active_flag_accepts_bitrix_spellings() {
        assert!(is_active(Some(&json!("Y"))));
        assert!(is_active(Some(&json!("true"))));
        assert!(is_active(Some(&json!(1))));
        assert!(is_active(Some(&json!(true))));
        assert!(!is_active(Some(&json!("N"))));
        assert!(!is_active(None));
    }

    fn client(server: &MockServer) -> BitrixClient {
        let config = BitrixConfig {
            contact_url: Some(format!("{}/crm.contact.list", server.uri())),
            users_url: Some(format!("{}/user.get", server.uri())),
        };
        BitrixClient::new(HttpClient::new().expect("http client"), &config)
    }

    #[tokio::test]
    async fn follows_pagination_and_filters_employees() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user.get"))
            .and(body_string_contains("\"start\":50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"ID": "7", "NAME": "Ірина", "LAST_NAME": "Коваль",
                     "PERSONAL_BIRTHDAY": "1988-06-10T03:00:00+03:00", "ACTIVE": true}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user.get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"ID": "1", "NAME": "Олег", "LAST_NAME": "Шевчук",
                     "PERSONAL_BIRTHDAY": "1990-06-10", "ACTIVE": "Y"},
                    {"ID": "2", "NAME": "Звільнений", "LAST_NAME": "",
                     "PERSONAL_BIRTHDAY": "1990-06-10", "ACTIVE": "N"},
                    {"ID": "3", "NAME": "Інший", "LAST_NAME": "День",
                     "PERSONAL_BIRTHDAY": "1990-06-11", "ACTIVE": "Y"}
                ],
                "next": 50
            })))
            .expect(1)
            .mount(&server)
            .await;

        let people = client(&server).employees_with_birthday(6, 10).await.unwrap();

        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        // Inactive and other-day users are dropped; output sorted by name.
        assert_eq!(names, vec!["Ірина Коваль", "Олег Шевчук"]);
    }

    #[tokio::test]
    async fn collects_client_phones_without_duplicates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/crm.contact.list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"items": [
                    {"ID": "11", "NAME": "", "LAST_NAME": "", "BIRTHDATE": "1985-06-10",
                     "PHONE": [
                         {"VALUE": "050 111-22-33"},
                         {"VALUE": "+380501112233"},
                         {"VALUE": "067 999 88 77"}
                     ]}
                ]}
            })))
            .mount(&server)
            .await;

        let people = client(&server).clients_with_birthday(6, 10).await.unwrap();

        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Без імені");
        assert_eq!(people[0].phones, vec!["+380501112233", "+380679998877"]);
    }

    #[tokio::test]
    async fn bitrix_error_payload_becomes_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user.get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "INVALID_TOKEN",
                "error_description": "webhook expired"
            })))
            .mount(&server)
            .await;

        let result = client(&server).employees_with_birthday(6, 10).await;
        assert!(matches!(result, Err(OpsPulseError::Network(_))));
    }

    #[tokio::test]
    async fn unconfigured_endpoint_yields_empty_list() {
        let config = BitrixConfig { contact_url: None, users_url: None };
        let client = BitrixClient::new(HttpClient::new().unwrap(), &config);

        assert!(client.employees_with_birthday(6, 10).await.unwrap().is_empty());
        assert!(client.clients_with_birthday(6, 10).await.unwrap().is_empty());
    }
}
