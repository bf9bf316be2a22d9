//! `Origin` / `Referer` comparison against candidate targets.

use std::fmt;

use super::target::TargetUrl;

/// Which sub-checks failed while comparing a request against one target.
///
/// Empty means the request matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeaderValidationInfo(u8);

impl HeaderValidationInfo {
    pub const ORIGIN_HOST: Self = Self(1);
    pub const ORIGIN_PORT: Self = Self(1 << 1);
    pub const ORIGIN_PROTOCOL: Self = Self(1 << 2);
    pub const REFERER_HOST: Self = Self(1 << 3);
    pub const REFERER_PORT: Self = Self(1 << 4);

    const ORIGIN_ALL: Self = Self(Self::ORIGIN_HOST.0 | Self::ORIGIN_PORT.0 | Self::ORIGIN_PROTOCOL.0);
    const REFERER_ALL: Self = Self(Self::REFERER_HOST.0 | Self::REFERER_PORT.0);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl fmt::Display for HeaderValidationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(HeaderValidationInfo, &str); 5] = [
            (HeaderValidationInfo::ORIGIN_HOST, "origin-host"),
            (HeaderValidationInfo::ORIGIN_PORT, "origin-port"),
            (HeaderValidationInfo::ORIGIN_PROTOCOL, "origin-protocol"),
            (HeaderValidationInfo::REFERER_HOST, "referer-host"),
            (HeaderValidationInfo::REFERER_PORT, "referer-port"),
        ];
        if self.is_empty() {
            return f.write_str("ok");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// `Origin` and `Referer` of one request, parsed once.
///
/// `None` means the header was absent. A present but unparsable header is
/// `Some(Err(..))` and never matches.
#[derive(Debug, Clone, Default)]
pub struct RequestSource {
    pub origin: Option<Result<TargetUrl, String>>,
    pub referer: Option<Result<TargetUrl, String>>,
}

impl RequestSource {
    #[must_use]
    pub fn new(origin: Option<&str>, referer: Option<&str>) -> Self {
        Self {
            origin: origin.map(TargetUrl::parse),
            referer: referer.map(TargetUrl::parse),
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.origin.is_none() && self.referer.is_none()
    }
}

/// Compare a request against a single target.
///
/// `Origin` must match protocol, host and port. When it is absent or does not
/// match, `Referer` gets a chance on host and port alone.
#[must_use]
pub fn check_target(source: &RequestSource, target: &TargetUrl) -> HeaderValidationInfo {
    let mut info = HeaderValidationInfo::empty();

    match &source.origin {
        Some(Ok(origin)) => {
            if origin.host != target.host {
                info.insert(HeaderValidationInfo::ORIGIN_HOST);
            }
            if origin.port != target.port {
                info.insert(HeaderValidationInfo::ORIGIN_PORT);
            }
            if origin.scheme != target.scheme {
                info.insert(HeaderValidationInfo::ORIGIN_PROTOCOL);
            }
            if info.is_empty() {
                return info;
            }
        }
        Some(Err(_)) => info.insert(HeaderValidationInfo::ORIGIN_ALL),
        None => {}
    }

    match &source.referer {
        Some(Ok(referer)) => {
            let mut referer_info = HeaderValidationInfo::empty();
            if referer.host != target.host {
                referer_info.insert(HeaderValidationInfo::REFERER_HOST);
            }
            if referer.port != target.port {
                referer_info.insert(HeaderValidationInfo::REFERER_PORT);
            }
            if referer_info.is_empty() {
                return referer_info;
            }
            info.insert(referer_info);
        }
        Some(Err(_)) => info.insert(HeaderValidationInfo::REFERER_ALL),
        None => {}
    }

    info
}
