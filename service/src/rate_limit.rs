use std::{
    net::{IpAddr, Ipv4Addr},
    num::NonZeroU32,
};

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

/// Per-client request quota, keyed by peer address.
pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl ClientRateLimiter {
    pub fn per_minute(uploads: NonZeroU32) -> Self {
        ClientRateLimiter {
            limiter: RateLimiter::keyed(Quota::per_minute(uploads)),
        }
    }

    /// Requests without a known peer share one bucket.
    pub fn check(&self, client: Option<IpAddr>) -> bool {
        let client = client.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        self.limiter.check_key(&client).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_is_per_client() {
        let limiter = ClientRateLimiter::per_minute(NonZeroU32::new(2).unwrap());
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(Some(first)));
        assert!(limiter.check(Some(first)));
        assert!(!limiter.check(Some(first)));
        assert!(limiter.check(Some(second)));
    }

    #[test]
    fn unknown_clients_share_a_bucket() {
        let limiter = ClientRateLimiter::per_minute(NonZeroU32::new(1).unwrap());
        assert!(limiter.check(None));
        assert!(!limiter.check(None));
    }
}
