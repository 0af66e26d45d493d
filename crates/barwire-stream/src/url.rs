//! Stream URL construction.

use barwire_types::BarSpec;

/// Maximum number of tick bars of history the tickbars endpoint replays.
const TICKBARS_MAX_BACK: u32 = 10;

/// Builds the streaming URL for the given bar spec and access token.
///
/// Time-based bars use the barchart endpoint:
/// `{base}/stream/barchart/{SYMBOL}/{interval}/{BarType}?SessionTemplate=...&daysBack=...&access_token=...&heartbeat=true`
///
/// Tick bars use the tickbars endpoint, which caps replayed history at a
/// fixed bar count instead of days:
/// `{base}/stream/tickbars/{SYMBOL}/{interval}/10?access_token=...&heartbeat=true`
///
/// # Example
///
/// ```
/// use barwire_stream::url::stream_url;
/// use barwire_types::{BarSpec, BarType};
///
/// let spec = BarSpec::new("@ES", BarType::Minute, 1);
/// let url = stream_url("https://api.example.com/v2", &spec, "tok");
/// assert_eq!(
///     url,
///     "https://api.example.com/v2/stream/barchart/@ES/1/Minute?SessionTemplate=Default&daysBack=1&access_token=tok&heartbeat=true"
/// );
/// ```
#[must_use]
pub fn stream_url(base_url: &str, spec: &BarSpec, access_token: &str) -> String {
    let symbol = spec.symbol.to_uppercase();
    if spec.bar_type.is_tick() {
        format!(
            "{}/stream/tickbars/{}/{}/{}?access_token={}&heartbeat=true",
            base_url, symbol, spec.interval, TICKBARS_MAX_BACK, access_token
        )
    } else {
        format!(
            "{}/stream/barchart/{}/{}/{}?SessionTemplate={}&daysBack={}&access_token={}&heartbeat=true",
            base_url,
            symbol,
            spec.interval,
            spec.bar_type.as_str(),
            spec.session_template,
            spec.days_back,
            access_token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barwire_types::BarType;

    #[test]
    fn test_barchart_url() {
        let spec = BarSpec::new("@es", BarType::Minute, 5)
            .with_days_back(3)
            .with_session_template("USEQPre");
        let url = stream_url("https://api.example.com/v2", &spec, "tok");
        assert_eq!(
            url,
            "https://api.example.com/v2/stream/barchart/@ES/5/Minute?SessionTemplate=USEQPre&daysBack=3&access_token=tok&heartbeat=true"
        );
    }

    #[test]
    fn test_tickbars_url() {
        let spec = BarSpec::new("msft", BarType::Tick, 500);
        let url = stream_url("https://api.example.com/v2", &spec, "tok");
        assert_eq!(
            url,
            "https://api.example.com/v2/stream/tickbars/MSFT/500/10?access_token=tok&heartbeat=true"
        );
    }

    #[test]
    fn test_symbol_uppercased() {
        let spec = BarSpec::new("aapl", BarType::Daily, 1);
        let url = stream_url("https://api.example.com/v2", &spec, "tok");
        assert!(url.contains("/AAPL/"));
        assert!(url.contains("/Daily?"));
    }
}
