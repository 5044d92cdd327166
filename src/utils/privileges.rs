use crate::core::errors::TelescopeError;

#[cfg(unix)]
fn effective_uid() -> Option<u32> {
    // Effective uid, so sudo counts as root
    Some(unsafe { libc::geteuid() })
}

#[cfg(not(unix))]
fn effective_uid() -> Option<u32> {
    None
}

/// SYN and OS detection scans need raw sockets.
pub fn require_root() -> Result<(), TelescopeError> {
    check_root(effective_uid())
}

fn check_root(euid: Option<u32>) -> Result<(), TelescopeError> {
    match euid {
        Some(0) => Ok(()),
        _ => Err(TelescopeError::InsufficientPrivileges),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_root_passes() {
        assert!(check_root(Some(0)).is_ok());
    }

    #[rstest]
    #[case(Some(1000))]
    #[case(Some(65534))]
    #[case(None)]
    fn test_non_root_is_rejected(#[case] euid: Option<u32>) {
        assert!(matches!(
            check_root(euid),
            Err(TelescopeError::InsufficientPrivileges)
        ));
    }
}
