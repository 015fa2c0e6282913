use game_types::{CredentialRejection, Credentials, GuessRejection, WORD_LENGTH};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 4;

/// Trim, uppercase and check a raw guess. Returns the word to send.
pub fn normalize_guess(input: &str) -> Result<String, GuessRejection> {
    let guess = input.trim().to_uppercase();
    let length = guess.chars().count();

    if length != WORD_LENGTH {
        return Err(GuessRejection::WrongLength { length });
    }

    if !guess.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(GuessRejection::NotAlphabetic);
    }

    Ok(guess)
}

/// Login only needs both fields present; the server decides the rest.
pub fn validate_login(username: &str, password: &str) -> Result<Credentials, CredentialRejection> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(CredentialRejection::Missing);
    }

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Registration applies the server's account rules up front.
pub fn validate_registration(
    username: &str,
    password: &str,
) -> Result<Credentials, CredentialRejection> {
    let credentials = validate_login(username, password)?;

    let length = credentials.username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Err(CredentialRejection::UsernameLength { length });
    }

    if credentials.password.chars().count() < PASSWORD_MIN {
        return Err(CredentialRejection::PasswordTooShort);
    }

    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_guesses_are_uppercased() {
        assert_eq!(normalize_guess("crane").unwrap(), "CRANE");
        assert_eq!(normalize_guess("  CrAnE \n").unwrap(), "CRANE");
        assert_eq!(normalize_guess("ZESTY").unwrap(), "ZESTY");
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            normalize_guess("cran"),
            Err(GuessRejection::WrongLength { length: 4 })
        );
        assert_eq!(
            normalize_guess("cranes"),
            Err(GuessRejection::WrongLength { length: 6 })
        );
        assert_eq!(
            normalize_guess("   "),
            Err(GuessRejection::WrongLength { length: 0 })
        );
    }

    #[test]
    fn test_non_letters_rejected() {
        assert_eq!(normalize_guess("cr4ne"), Err(GuessRejection::NotAlphabetic));
        assert_eq!(normalize_guess("cr ne"), Err(GuessRejection::NotAlphabetic));
        assert_eq!(normalize_guess("cr-ne"), Err(GuessRejection::NotAlphabetic));
        // Non-ASCII letters are outside A-Z even after uppercasing.
        assert_eq!(normalize_guess("crâne"), Err(GuessRejection::NotAlphabetic));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            GuessRejection::WrongLength { length: 2 }.to_string(),
            "Guess must be 5 letters"
        );
        assert_eq!(
            GuessRejection::NotAlphabetic.to_string(),
            "Guess must contain only letters"
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(validate_login("", "pw"), Err(CredentialRejection::Missing));
        assert_eq!(validate_login("   ", "pw"), Err(CredentialRejection::Missing));
        assert_eq!(validate_login("alice", ""), Err(CredentialRejection::Missing));

        let credentials = validate_login("  alice ", "pw").unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, "pw");
    }

    #[test]
    fn test_registration_rules() {
        assert_eq!(
            validate_registration("al", "secret"),
            Err(CredentialRejection::UsernameLength { length: 2 })
        );
        assert_eq!(
            validate_registration(&"a".repeat(21), "secret"),
            Err(CredentialRejection::UsernameLength { length: 21 })
        );
        assert_eq!(
            validate_registration("alice", "abc"),
            Err(CredentialRejection::PasswordTooShort)
        );
        assert!(validate_registration("alice", "abcd").is_ok());
        assert!(validate_registration(&"a".repeat(20), "abcd").is_ok());
    }
}
