//! Remote command lines. Every value that reaches a command line goes
//! through [`shell_quote`]; everything else is a constant.

use crate::domain::model::{Command, Domain};

/// BIND's new-zone file on the name servers (`rndc addzone` entries).
pub const ZONE_CONFIG_PATH: &str = "/var/opt/isc/scls/isc-bind/zones/_default.nzf";

const IPV4_PATTERN: &str = r"((25[0-5]|(2[0-4]|1\d|[1-9]|)\d)\.?\b){4}";

pub const PLESK_LOGIN_REDIRECT: &str = "&success_redirect_url=%2Fadmin%2Fsubscription%2Foverview%2Fid%2F";

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c)
}

/// Quotes `value` as exactly one POSIX shell word.
///
/// Values made only of unambiguous characters are returned unchanged,
/// anything else is wrapped in single quotes with embedded single quotes
/// spelled `'"'"'`.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value.chars().all(is_shell_safe) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

pub fn build_zone_master_command(domain: &Domain) -> Command {
    Command::new(format!(
        "cat {} | grep {} | grep -Po '{}' | head -n1",
        ZONE_CONFIG_PATH,
        shell_quote(domain.as_str()),
        IPV4_PATTERN
    ))
}

pub fn build_removal_command(domain: &Domain) -> Command {
    Command::new(format!("rndc delzone {}", shell_quote(domain.as_str())))
}

pub fn build_subscription_query(domain: &Domain) -> String {
    let d = domain.as_str();
    format!(
        "SELECT CASE WHEN webspace_id = 0 THEN id ELSE webspace_id END AS result \
         FROM domains WHERE name LIKE '{d}'; \
         SELECT name FROM domains WHERE id=(SELECT CASE WHEN webspace_id = 0 THEN id ELSE webspace_id END AS result FROM domains WHERE name LIKE '{d}'); \
         SELECT pname, login FROM clients WHERE id=(SELECT cl_id FROM domains WHERE name LIKE '{d}'); \
         SELECT name FROM domains WHERE webspace_id=(SELECT CASE WHEN webspace_id = 0 THEN id ELSE webspace_id END AS result FROM domains WHERE name LIKE '{d}');"
    )
}

pub fn build_subscription_exists_query(subscription_id: u64) -> String {
    format!(
        "SELECT name FROM domains WHERE webspace_id=0 AND id={}",
        subscription_id
    )
}

pub fn build_plesk_db_command(query: &str) -> Command {
    Command::new(format!("plesk db -Ne {}", shell_quote(query)))
}

/// `username` must already have passed `validate_linux_username`.
pub fn build_plesk_login_command(username: &str) -> Command {
    Command::new(format!("plesk login {}", shell_quote(username)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::validation::validate_domain;

    /// Minimal POSIX word splitter: whitespace, single quotes, double quotes
    /// and backslash escapes.
    pub(crate) fn shell_words(input: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut in_word = false;
        let mut chars = input.chars();

        while let Some(c) = chars.next() {
            match c {
                '\'' => {
                    in_word = true;
                    for q in chars.by_ref() {
                        if q == '\'' {
                            break;
                        }
                        current.push(q);
                    }
                }
                '"' => {
                    in_word = true;
                    while let Some(q) = chars.next() {
                        match q {
                            '"' => break,
                            '\\' => {
                                if let Some(next) = chars.next() {
                                    if !"$`\"\\\n".contains(next) {
                                        current.push('\\');
                                    }
                                    current.push(next);
                                }
                            }
                            _ => current.push(q),
                        }
                    }
                }
                '\\' => {
                    in_word = true;
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    in_word = true;
                    current.push(c);
                }
            }
        }
        if in_word {
            words.push(current);
        }
        words
    }

    #[test]
    fn test_basic_zone_master_command() {
        let domain = validate_domain("example.com").unwrap();
        let expected = r"cat /var/opt/isc/scls/isc-bind/zones/_default.nzf | grep example.com | grep -Po '((25[0-5]|(2[0-4]|1\d|[1-9]|)\d)\.?\b){4}' | head -n1";
        assert_eq!(build_zone_master_command(&domain).as_str(), expected);
    }

    #[test]
    fn test_lowercase_conversion() {
        let upper = validate_domain("EXAMPLE.COM").unwrap();
        let lower = validate_domain("example.com").unwrap();
        assert_eq!(build_zone_master_command(&upper), build_zone_master_command(&lower));
    }

    #[test]
    fn test_domain_is_exactly_one_shell_word() {
        let domain = validate_domain("Sub-1.Example.com").unwrap();
        let words = shell_words(build_zone_master_command(&domain).as_str());

        assert_eq!(
            words,
            vec![
                "cat",
                ZONE_CONFIG_PATH,
                "|",
                "grep",
                "sub-1.example.com",
                "|",
                "grep",
                "-Po",
                IPV4_PATTERN,
                "|",
                "head",
                "-n1",
            ]
        );
    }

    #[test]
    fn test_quoting_neutralises_injection_payloads() {
        let payloads = [
            "example.com;echo hello",
            "bad;rm -rf /",
            "a'b",
            "''",
            "$(id)",
            "`id`",
            "x | cat /etc/shadow",
            "new\nline",
            "it's \"quoted\"",
            "",
        ];

        for payload in payloads {
            let line = format!("grep {}", shell_quote(payload));
            assert_eq!(
                shell_words(&line),
                vec!["grep".to_string(), payload.to_string()],
                "payload {:?} quoted as {:?}",
                payload,
                line
            );
        }
    }

    #[test]
    fn test_shell_quote_leaves_safe_values_alone() {
        assert_eq!(shell_quote("example.com"), "example.com");
        assert_eq!(shell_quote("a;b"), "'a;b'");
        assert_eq!(shell_quote("a'b"), r#"'a'"'"'b'"#);
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_removal_command() {
        let domain = validate_domain("Example.com").unwrap();
        assert_eq!(build_removal_command(&domain).as_str(), "rndc delzone example.com");
    }

    #[test]
    fn test_subscription_query() {
        let domain = validate_domain("example.com").unwrap();
        let expected = "SELECT CASE WHEN webspace_id = 0 THEN id ELSE webspace_id END AS result \
FROM domains WHERE name LIKE 'example.com'; \
SELECT name FROM domains WHERE id=(SELECT CASE WHEN webspace_id = 0 THEN id ELSE webspace_id END AS result FROM domains WHERE name LIKE 'example.com'); \
SELECT pname, login FROM clients WHERE id=(SELECT cl_id FROM domains WHERE name LIKE 'example.com'); \
SELECT name FROM domains WHERE webspace_id=(SELECT CASE WHEN webspace_id = 0 THEN id ELSE webspace_id END AS result FROM domains WHERE name LIKE 'example.com');";
        assert_eq!(build_subscription_query(&domain), expected);
    }

    #[test]
    fn test_plesk_db_command_keeps_query_as_one_word() {
        let domain = validate_domain("example.com").unwrap();
        let query = build_subscription_query(&domain);
        let words = shell_words(build_plesk_db_command(&query).as_str());
        assert_eq!(words, vec!["plesk".to_string(), "db".to_string(), "-Ne".to_string(), query]);
    }

    #[test]
    fn test_plesk_login_command() {
        assert_eq!(build_plesk_login_command("jdoe").as_str(), "plesk login jdoe");
        assert_eq!(build_plesk_login_command("machine$").as_str(), "plesk login 'machine$'");
    }
}
