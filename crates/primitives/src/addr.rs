use std::net::IpAddr;

/// Canonicalize an observed peer address.
///
/// Dual-stack listeners report IPv4 clients as IPv4-mapped IPv6
/// (`::ffff:a.b.c.d`); those collapse to the embedded IPv4 address so the
/// stored endpoint matches what other peers can actually dial. Everything
/// else, including genuine IPv6, passes through unchanged.
#[must_use]
pub fn normalize_ip(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V4(_) => addr,
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use super::normalize_ip;

    #[test]
    fn ipv4_passes_through() {
        let addr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5));
        assert_eq!(normalize_ip(addr), addr);
    }

    #[test]
    fn ipv4_mapped_collapses() {
        let addr: IpAddr = "::ffff:203.0.113.5".parse().unwrap();
        assert_eq!(
            normalize_ip(addr),
            IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5))
        );
    }

    #[test]
    fn plain_ipv6_passes_through() {
        let addr = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));
        assert_eq!(normalize_ip(addr), addr);
    }

    #[test]
    fn ipv4_compatible_is_not_collapsed() {
        // `::a.b.c.d` is deprecated IPv4-compatible, not IPv4-mapped.
        let addr: IpAddr = "::203.0.113.5".parse().unwrap();
        assert_eq!(normalize_ip(addr), addr);
    }
}
