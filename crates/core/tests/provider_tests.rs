// ═══════════════════════════════════════════════════════════════════
// Provider Tests — CryptoRank response mapping, HTTP round trip
// against a local stub server, sample provider, trait objects
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use vc_dashboard_core::errors::CoreError;
use vc_dashboard_core::models::firm::Firm;
use vc_dashboard_core::providers::cryptorank::{parse_funds_response, CryptoRankProvider};
use vc_dashboard_core::providers::sample::SampleFundProvider;
use vc_dashboard_core::providers::traits::FundProvider;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

const FULL_FUND: &str = r#"{
  "data": [
    {
      "name": "Paradigm",
      "image": { "small": "https://img/paradigm.png" },
      "description": "Crypto-native investment firm.",
      "aum": 12500000000,
      "categories": ["DeFi", "Infrastructure"],
      "links": { "website": "https://paradigm.xyz" },
      "investmentStages": ["Seed", "Series A"],
      "investments": [
        { "date": "2023-01-15T00:00:00.000Z", "amount": 1000000, "stage": "Seed", "project": { "name": "Alpha" } },
        { "date": "2023-04-01", "amount": 2000000, "stage": "Series A", "project": { "name": "Beta" } }
      ],
      "portfolio": [
        {
          "name": "Alpha",
          "image": { "small": "https://img/alpha.png" },
          "links": { "website": "https://alpha.xyz" },
          "categories": ["DeFi"],
          "investmentDate": "2023-01-15",
          "stage": "Seed"
        },
        { "name": "Gamma", "stage": "Strategic" }
      ],
      "status": "Active",
      "location": "United States"
    }
  ]
}"#;

// ═══════════════════════════════════════════════════════════════════
// Response mapping
// ═══════════════════════════════════════════════════════════════════

mod cryptorank_mapping {
    use super::*;

    fn paradigm() -> Firm {
        parse_funds_response(FULL_FUND).unwrap().remove(0)
    }

    #[test]
    fn maps_scalar_fields() {
        let f = paradigm();
        assert_eq!(f.name, "Paradigm");
        assert_eq!(f.logo, "https://img/paradigm.png");
        assert_eq!(f.description, "Crypto-native investment firm.");
        assert_eq!(f.aum, 12.5e9);
        assert_eq!(f.formatted_aum(), "$12.5B");
        assert_eq!(f.focus, vec!["DeFi", "Infrastructure"]);
        assert_eq!(f.website, "https://paradigm.xyz");
        assert_eq!(f.status, "Active");
        assert_eq!(f.jurisdiction, "United States");
    }

    #[test]
    fn maps_investments() {
        let f = paradigm();
        assert_eq!(f.investments.len(), 2);
        assert_eq!(f.investments[0].date, d(2023, 1, 15));
        assert_eq!(f.investments[0].amount, 1_000_000.0);
        assert_eq!(f.investments[0].round, "Seed");
        assert_eq!(f.investments[0].project, "Alpha");
        assert_eq!(f.investments[1].date, d(2023, 4, 1));
    }

    #[test]
    fn maps_portfolio_with_defaults() {
        let f = paradigm();
        assert_eq!(f.portfolio_companies.len(), 2);
        let alpha = &f.portfolio_companies[0];
        assert_eq!(alpha.profile_url, "https://alpha.xyz");
        assert_eq!(alpha.investment_date, Some(d(2023, 1, 15)));
        let gamma = &f.portfolio_companies[1];
        assert_eq!(gamma.logo, "https://picsum.photos/200");
        assert_eq!(gamma.profile_url, "#");
        assert!(gamma.sectors.is_empty());
        assert_eq!(gamma.investment_date, None);
    }

    #[test]
    fn stages_merged_and_deduplicated() {
        assert_eq!(paradigm().investment_stages, vec!["Seed", "Series A", "Strategic"]);
    }

    #[test]
    fn empty_fund_gets_defaults() {
        let firms = parse_funds_response(r#"{"data":[{}]}"#).unwrap();
        let f = &firms[0];
        assert_eq!(f.name, "Unnamed Fund");
        assert_eq!(f.logo, "https://picsum.photos/200");
        assert_eq!(
            f.description,
            "Investment firm focused on blockchain and crypto projects."
        );
        assert_eq!(f.aum, 0.0);
        assert_eq!(f.focus, vec!["Crypto", "Blockchain"]);
        assert_eq!(f.website, "#");
        assert_eq!(f.status, "Inactive");
        assert_eq!(f.jurisdiction, "Unknown Location");
        assert!(f.investments.is_empty());
    }

    #[test]
    fn non_numeric_aum_is_zero() {
        let firms = parse_funds_response(r#"{"data":[{"aum":"n/a"}]}"#).unwrap();
        assert_eq!(firms[0].aum, 0.0);
    }

    #[test]
    fn investment_defaults() {
        let firms = parse_funds_response(
            r#"{"data":[{"investments":[{"date":"2022-05-05"}]}]}"#,
        )
        .unwrap();
        let inv = &firms[0].investments[0];
        assert_eq!(inv.amount, 0.0);
        assert_eq!(inv.round, "Undisclosed");
        assert_eq!(inv.project, "Unknown Project");
        assert_eq!(firms[0].status, "Active Investor");
    }

    #[test]
    fn missing_investment_date_fails() {
        let err = parse_funds_response(
            r#"{"data":[{"name":"Broken","investments":[{"amount":5}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DataError(_)));
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn negative_investment_amount_fails() {
        let err = parse_funds_response(
            r#"{"data":[{"investments":[{"date":"2022-05-05","amount":-5}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DataError(_)));
    }

    #[test]
    fn missing_data_is_empty_list() {
        assert!(parse_funds_response("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_api_error() {
        let err = parse_funds_response("<html>").unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }
}

// ═══════════════════════════════════════════════════════════════════
// HTTP round trip against a one-shot local server
// ═══════════════════════════════════════════════════════════════════

/// Serve exactly one HTTP response; the join handle yields the raw request head.
async fn one_shot_server(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });
    (format!("http://{addr}/v2"), handle)
}

mod cryptorank_http {
    use super::*;

    #[tokio::test]
    async fn fetch_funds_sends_key_and_limit() {
        let (base, server) = one_shot_server("200 OK", FULL_FUND).await;
        let provider = CryptoRankProvider::with_base_url("test-key".into(), base);

        let firms = provider.fetch_funds(5).await.unwrap();
        assert_eq!(firms.len(), 1);
        assert_eq!(firms[0].name, "Paradigm");

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /v2/fund?"), "{request_line}");
        assert!(request_line.contains("key=test-key"));
        assert!(request_line.contains("limit=5"));
        assert!(request.to_lowercase().contains("accept: application/json"));
    }

    #[tokio::test]
    async fn error_status_uses_body_message() {
        let (base, server) =
            one_shot_server("401 Unauthorized", r#"{"message":"Invalid API key"}"#).await;
        let provider = CryptoRankProvider::with_base_url("bad".into(), base);

        let err = provider.fetch_funds(10).await.unwrap_err();
        match err {
            CoreError::Api { provider, message } => {
                assert_eq!(provider, "CryptoRank");
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error_without_key() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider =
            CryptoRankProvider::with_base_url("super-secret".into(), format!("http://{addr}/v2"));
        let err = provider.fetch_funds(10).await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
        assert!(!err.to_string().contains("super-secret"));
    }

    #[test]
    fn provider_name() {
        assert_eq!(CryptoRankProvider::new("k".into()).name(), "CryptoRank");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Sample provider
// ═══════════════════════════════════════════════════════════════════

mod sample_provider {
    use super::*;

    #[tokio::test]
    async fn returns_three_firms() {
        let firms = SampleFundProvider::new().fetch_funds(10).await.unwrap();
        let names: Vec<&str> = firms.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Andreessen Horowitz", "Paradigm", "Polychain Capital"]);
    }

    #[tokio::test]
    async fn respects_limit() {
        let firms = SampleFundProvider::new().fetch_funds(2).await.unwrap();
        assert_eq!(firms.len(), 2);
    }

    #[test]
    fn every_sample_firm_has_valid_investments() {
        for firm in SampleFundProvider::firms().unwrap() {
            assert!(!firm.investments.is_empty(), "{} has no investments", firm.name);
            assert!(firm.investments.iter().all(|i| i.validate().is_ok()));
            assert_eq!(firm.status, "Active Investor");
        }
    }

    #[test]
    fn sample_aum_formats() {
        let firms = SampleFundProvider::firms().unwrap();
        assert_eq!(firms[0].formatted_aum(), "$35.0B");
        assert_eq!(firms[2].formatted_aum(), "$4.0B");
    }

    #[test]
    fn sample_has_same_day_tranches() {
        let firms = SampleFundProvider::firms().unwrap();
        let aptos_on_day: Vec<_> = firms[0]
            .investments
            .iter()
            .filter(|i| i.project == "Aptos" && i.date == d(2022, 7, 25))
            .collect();
        assert_eq!(aptos_on_day.len(), 2);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Trait objects
// ═══════════════════════════════════════════════════════════════════

struct FailingProvider;

#[async_trait]
impl FundProvider for FailingProvider {
    fn name(&self) -> &str {
        "Failing"
    }

    async fn fetch_funds(&self, _limit: usize) -> Result<Vec<Firm>, CoreError> {
        Err(CoreError::Api {
            provider: "Failing".into(),
            message: "rate limited".into(),
        })
    }
}

mod trait_objects {
    use super::*;

    #[tokio::test]
    async fn boxed_providers_dispatch() {
        let providers: Vec<Box<dyn FundProvider>> =
            vec![Box::new(SampleFundProvider::new()), Box::new(FailingProvider)];
        assert!(providers[0].fetch_funds(1).await.is_ok());
        let err = providers[1].fetch_funds(1).await.unwrap_err();
        assert_eq!(err.to_string(), "API error (Failing): rate limited");
    }
}
