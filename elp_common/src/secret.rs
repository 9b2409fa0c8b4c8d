use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A wrapper for credentials and tokens that must never end up in log output.
/// `Debug` and `Display` both render as `****`; the value is only accessible
/// via an explicit [`Secret::reveal`] call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn secrets_do_not_leak_via_format() {
        let secret = Secret::new("hunter2".to_string());
        assert_eq!(format!("{secret}"), "****");
        assert_eq!(format!("{secret:?}"), "****");
        assert_eq!(secret.reveal(), "hunter2");
    }

    #[test]
    fn secrets_do_not_leak_via_containing_types() {
        #[derive(Debug)]
        struct Credentials {
            #[allow(dead_code)]
            token: Secret<String>,
        }
        let creds = Credentials { token: Secret::new("s3cr3t".to_string()) };
        let formatted = format!("{creds:?}");
        assert!(formatted.contains("****"));
        assert!(!formatted.contains("s3cr3t"));
    }
}
