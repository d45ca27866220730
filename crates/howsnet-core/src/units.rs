//! 표시용 단위 변환.

/// Kbit 값을 적절한 단위 문자열로 변환 (Kbits → Mbits → Gbits → Tbits)
pub fn kbits_to_str(kbits: f64) -> String {
    if kbits < 1024.0 {
        return format!("{kbits:.2}Kbits");
    }
    let mbits = kbits / 1024.0;
    if mbits < 1024.0 {
        return format!("{mbits:.2}Mbits");
    }
    let gbits = mbits / 1024.0;
    if gbits < 1024.0 {
        return format!("{gbits:.2}Gbits");
    }
    format!("{:.2}Tbits", gbits / 1024.0)
}

/// 지연 시간 문자열. 센티널(0 이하)은 타임아웃으로 표시
pub fn ping_to_str(latency_ms: f64) -> String {
    if latency_ms > 0.0 {
        format!("{latency_ms:.0}ms")
    } else {
        "timeout".to_string()
    }
}

/// 초 단위 시간을 `42s`, `03m07s`, `2h05m09s` 형식으로 변환
pub fn duration_to_str(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{:02}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h{:02}m{:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kbits_units() {
        assert_eq!(kbits_to_str(512.0), "512.00Kbits");
        assert_eq!(kbits_to_str(2048.0), "2.00Mbits");
        assert_eq!(kbits_to_str(3.0 * 1024.0 * 1024.0), "3.00Gbits");
        assert_eq!(kbits_to_str(1024.0 * 1024.0 * 1024.0), "1.00Tbits");
    }

    #[test]
    fn ping_sentinel_is_timeout() {
        assert_eq!(ping_to_str(23.4), "23ms");
        assert_eq!(ping_to_str(-1.0), "timeout");
        assert_eq!(ping_to_str(0.0), "timeout");
    }

    #[test]
    fn duration_formats() {
        assert_eq!(duration_to_str(42), "42s");
        assert_eq!(duration_to_str(187), "03m07s");
        assert_eq!(duration_to_str(7509), "2h05m09s");
        assert_eq!(duration_to_str(-5), "0s");
    }
}
