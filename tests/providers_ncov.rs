// tests/providers_ncov.rs
use monitor_sampler::ingest::fetch::FixtureFetcher;
use monitor_sampler::ingest::providers::ncov::{acquire, fetch_epidemic_status, parse_epidemic_status};
use monitor_sampler::CityStatus;

fn fixture() -> Vec<u8> {
    std::fs::read("tests/fixtures/ncov_page.html").expect("missing tests/fixtures/ncov_page.html")
}

#[test]
fn end_to_end_example_maps_counts_to_fields() {
    let body = concat!(
        "...junk...",
        r#"[{"provinceName":"X","cities":[{"cityName":"Y","suspectedCount":1,"confirmedCount":2,"curedCount":3,"deadCount":4}]}]"#,
        "}catch(e){}...junk..."
    );
    let got = parse_epidemic_status(body.as_bytes());
    assert!(got.error.is_none());
    assert_eq!(
        got.value,
        vec![CityStatus {
            province: "X".into(),
            city: "Y".into(),
            suspected: 1,
            confirmed: 2,
            cured: 3,
            dead: 4,
        }]
    );
}

#[test]
fn fixture_page_yields_one_row_per_city_in_order() {
    let got = parse_epidemic_status(&fixture());
    assert!(got.error.is_none(), "{:?}", got.error);

    let pairs: Vec<(&str, &str)> = got
        .value
        .iter()
        .map(|c| (c.province.as_str(), c.city.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("湖北省", "武汉"),
            ("湖北省", "黄冈"),
            ("广东省", "深圳"),
            ("广东省", "广州"),
            ("吉林省", "吉林"),
            ("吉林市", "吉林"),
        ]
    );

    // float counts are truncated, not rounded
    assert_eq!(got.value[1].confirmed, 64);
    assert_eq!(got.value[1].dead, 0);
    assert_eq!(got.value[3].suspected, 3);
}

#[test]
fn missing_opening_anchor_is_empty_not_fatal() {
    let got = parse_epidemic_status("<html>改版了 no data here }catch(e){}</html>".as_bytes());
    assert!(got.value.is_empty());
    assert_eq!(got.error.map(|e| e.kind()), Some("shape"));
}

#[test]
fn missing_closing_anchor_is_empty_not_fatal() {
    let mut body = fixture();
    // truncate right after the opening anchor, as a cut-off download would
    let cut = body
        .windows(4)
        .position(|w| w == b"[{\"p")
        .expect("anchor in fixture");
    body.truncate(cut + 200);
    let got = parse_epidemic_status(&body);
    assert!(got.value.is_empty());
    assert!(got.error.is_some());
}

#[test]
fn wrong_top_level_shape_is_reported() {
    let body = br#"[{"provinceName":"X"}]}catch(e){}"#;
    let got = parse_epidemic_status(body);
    assert!(got.value.is_empty());
    assert_eq!(got.error.map(|e| e.kind()), Some("shape"));
}

#[test]
fn non_utf8_bytes_around_payload_do_not_matter() {
    let mut body: Vec<u8> = vec![0xff, 0xfe, 0xc3];
    body.extend_from_slice("<script>try { window.getAreaStat = ".as_bytes());
    body.extend_from_slice(
        r#"[{"provinceName":"X","cities":[{"cityName":"Y","suspectedCount":1,"confirmedCount":2,"curedCount":3,"deadCount":4}]}]"#
            .as_bytes(),
    );
    body.extend_from_slice(b"}catch(e){}");
    // GBK-encoded text and a dangling UTF-8 lead byte after the payload
    body.extend_from_slice(&[0xd2, 0xdf, 0xc7, 0xe9, 0xe4, 0xb8]);

    assert!(std::str::from_utf8(&body).is_err());
    let got = parse_epidemic_status(&body);
    assert!(got.error.is_none(), "{:?}", got.error);
    assert_eq!(got.value.len(), 1);
    assert_eq!(got.value[0].city, "Y");
    assert_eq!(got.value[0].confirmed, 2);
}

#[test]
fn same_bytes_same_output() {
    let body = fixture();
    let a = parse_epidemic_status(&body).value;
    let b = parse_epidemic_status(&body).value;
    assert_eq!(a, b);
}

#[tokio::test]
async fn fetch_uses_fetcher_body() {
    let fetcher = FixtureFetcher::new(fixture());
    let rows = fetch_epidemic_status(&fetcher).await;
    assert_eq!(rows.len(), 6);
}

#[tokio::test]
async fn failed_or_empty_fetch_gives_empty_list() {
    let failing = FixtureFetcher::failing();
    assert!(fetch_epidemic_status(&failing).await.is_empty());
    let got = acquire(&failing).await;
    assert_eq!(got.error.map(|e| e.kind()), Some("fetch"));

    let empty = FixtureFetcher::new(Vec::new());
    let got = acquire(&empty).await;
    assert!(got.value.is_empty());
    assert_eq!(got.error.map(|e| e.kind()), Some("empty"));
}
