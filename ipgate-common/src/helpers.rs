use std::net::Ipv4Addr;

/// Converts an IPv4 literal to its 32-bit numeric form for range matching.
/// Anything that is not a plain IPv4 literal (IPv6, hostnames, garbage from
/// forged headers) yields `None` so range checks fail safe.
pub fn ipv4_to_u32(address: &str) -> Option<u32> {
    address.trim().parse::<Ipv4Addr>().ok().map(u32::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_ipv4() {
        assert_eq!(ipv4_to_u32("0.0.0.0"), Some(0));
        assert_eq!(ipv4_to_u32("0.0.0.1"), Some(1));
        assert_eq!(ipv4_to_u32("192.168.1.1"), Some(0xC0A80101));
        assert_eq!(ipv4_to_u32("255.255.255.255"), Some(u32::MAX));
    }

    #[test]
    fn test_rejects_non_ipv4() {
        assert_eq!(ipv4_to_u32("2001:db8::1"), None);
        assert_eq!(ipv4_to_u32("example.com"), None);
        assert_eq!(ipv4_to_u32("999.1.1.1"), None);
        assert_eq!(ipv4_to_u32(""), None);
    }
}
