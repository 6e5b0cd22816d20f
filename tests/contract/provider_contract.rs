#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use ashare_core::{
    BarSource, FetchRequest, FixedClock, QuoteRequest, SinaAdapter, SourceErrorKind, SourceId,
    TencentDayAdapter, TencentMinuteAdapter,
};
use serde_json::json;
use time::macros::datetime;

use support::{
    sina_daily_payload, tencent_day_payload, tencent_minute_payload, ScriptedHttpClient, TODAY,
};

const TENCENT_DAY: &str = "http://web.ifzq.gtimg.cn/appstock/app/fqkline/get";
const TENCENT_MINUTE: &str = "http://ifzq.gtimg.cn/appstock/app/kline/mkline";
const SINA: &str =
    "http://money.finance.sina.com.cn/quotes_service/api/json_v2.php/CN_MarketData.getKLineData";

fn fetch_request(code: &str, end_date: &str, count: usize, frequency: &str) -> FetchRequest {
    let request = QuoteRequest::parse(code, end_date, count, frequency).expect("valid request");
    FetchRequest::from(&request)
}

fn tencent_day(http: &Arc<ScriptedHttpClient>) -> TencentDayAdapter {
    TencentDayAdapter::new(http.clone(), Arc::new(FixedClock(TODAY)))
}

fn tencent_minute(http: &Arc<ScriptedHttpClient>) -> TencentMinuteAdapter {
    TencentMinuteAdapter::new(http.clone())
}

fn sina(http: &Arc<ScriptedHttpClient>) -> SinaAdapter {
    SinaAdapter::new(http.clone(), Arc::new(FixedClock(TODAY)))
}

#[test]
fn adapters_report_their_ids_and_frequency_support() {
    let http = ScriptedHttpClient::new();
    let day = tencent_day(&http);
    let minute = tencent_minute(&http);
    let sina = sina(&http);

    assert_eq!(day.id(), SourceId::TencentDay);
    assert_eq!(minute.id(), SourceId::TencentMinute);
    assert_eq!(sina.id(), SourceId::Sina);

    for frequency in ashare_core::Frequency::ALL {
        assert_eq!(day.supports(frequency), frequency.is_daily_family());
        assert_eq!(minute.supports(frequency), frequency.is_intraday());
        assert!(sina.supports(frequency));
    }
}

#[test]
fn tencent_day_urls_are_byte_exact() {
    let http = ScriptedHttpClient::new();
    let adapter = tencent_day(&http);

    assert_eq!(
        adapter.request_url(&fetch_request("000001.XSHE", "2024-03-01", 3, "1d")),
        format!("{TENCENT_DAY}?param=sz000001,day,,2024-03-01,3,qfq")
    );
    assert_eq!(
        adapter.request_url(&fetch_request("sh600519", "2024-01-31", 12, "1w")),
        format!("{TENCENT_DAY}?param=sh600519,week,,2024-01-31,12,qfq")
    );
    assert_eq!(
        adapter.request_url(&fetch_request("sh600519", "", 6, "1M")),
        format!("{TENCENT_DAY}?param=sh600519,month,,,6,qfq")
    );
}

#[test]
fn tencent_day_sends_empty_end_date_for_today() {
    let http = ScriptedHttpClient::new();
    let adapter = tencent_day(&http);

    assert_eq!(
        adapter.request_url(&fetch_request("sz000001", "2024-03-08", 3, "1d")),
        format!("{TENCENT_DAY}?param=sz000001,day,,,3,qfq")
    );
}

#[tokio::test]
async fn tencent_day_prefers_adjusted_series() {
    let http = ScriptedHttpClient::new();
    let url = format!("{TENCENT_DAY}?param=sz000001,day,,,3,qfq");
    let mut payload = tencent_day_payload("sz000001", "qfqday");
    payload["data"]["sz000001"]["day"] = json!([
        ["2024-03-08", "1.00", "1.00", "1.00", "1.00", "1.000"]
    ]);
    http.respond_json(&url, &payload);

    let series = tencent_day(&http)
        .fetch(fetch_request("sz000001", "", 3, "1d"))
        .await
        .expect("adjusted series");

    assert_eq!(series.len(), 3);
    let last = series.bars().last().expect("last bar");
    assert_eq!(last.timestamp, datetime!(2024-03-08 00:00));
    assert_eq!(last.close, 10.8);
    assert_eq!(http.requested_urls(), vec![url]);
}

#[tokio::test]
async fn tencent_day_reads_raw_series_for_indices() {
    let http = ScriptedHttpClient::new();
    http.respond_json(
        format!("{TENCENT_DAY}?param=sh000001,day,,2024-03-07,10,qfq"),
        &tencent_day_payload("sh000001", "day"),
    );

    let series = tencent_day(&http)
        .fetch(fetch_request("000001.XSHG", "2024-03-07", 10, "1d"))
        .await
        .expect("raw series");

    assert_eq!(series.code().as_str(), "sh000001");
    assert_eq!(series.len(), 4);
    let first = &series.bars()[0];
    assert_eq!(first.timestamp, datetime!(2024-03-05 00:00));
    assert_eq!(first.open, 10.2);
    assert_eq!(first.volume, 1100.0);
}

#[tokio::test]
async fn tencent_day_without_known_series_is_parse_error() {
    let http = ScriptedHttpClient::new();
    http.respond_json(
        format!("{TENCENT_DAY}?param=sz000001,week,,,3,qfq"),
        &tencent_day_payload("sz000001", "qfqday"),
    );

    let error = tencent_day(&http)
        .fetch(fetch_request("sz000001", "", 3, "1w"))
        .await
        .expect_err("no week series");
    assert_eq!(error.kind(), SourceErrorKind::Parse);
}

#[test]
fn tencent_minute_url_ignores_end_date() {
    let http = ScriptedHttpClient::new();
    let adapter = tencent_minute(&http);

    let expected = format!("{TENCENT_MINUTE}?param=sz000001,m5,,3");
    assert_eq!(
        adapter.request_url(&fetch_request("000001.XSHE", "", 3, "5m")),
        expected
    );
    assert_eq!(
        adapter.request_url(&fetch_request("000001.XSHE", "2024-01-02", 3, "5m")),
        expected
    );
    assert_eq!(
        adapter.request_url(&fetch_request("sh600519", "", 20, "1m")),
        format!("{TENCENT_MINUTE}?param=sh600519,m1,,20")
    );
}

#[tokio::test]
async fn tencent_minute_overrides_latest_close_with_live_quote() {
    let http = ScriptedHttpClient::new();
    http.respond_json(
        format!("{TENCENT_MINUTE}?param=sz000001,m5,,3"),
        &tencent_minute_payload("sz000001", "m5", "10.88"),
    );

    let series = tencent_minute(&http)
        .fetch(fetch_request("sz000001", "", 3, "5m"))
        .await
        .expect("minute series");

    let times = series
        .bars()
        .iter()
        .map(|bar| bar.timestamp)
        .collect::<Vec<_>>();
    assert_eq!(
        times,
        vec![
            datetime!(2024-03-08 14:50),
            datetime!(2024-03-08 14:55),
            datetime!(2024-03-08 15:00),
        ]
    );
    assert_eq!(series.bars()[2].close, 10.88);
    assert_eq!(series.bars()[2].open, 10.72);
    assert_eq!(series.bars()[1].close, 10.72);
}

#[tokio::test]
async fn tencent_minute_missing_quote_is_parse_error() {
    let http = ScriptedHttpClient::new();
    let mut payload = tencent_minute_payload("sz000001", "m1", "10.88");
    payload["data"]["sz000001"]["qt"] = json!({});
    http.respond_json(format!("{TENCENT_MINUTE}?param=sz000001,m1,,3"), &payload);

    let error = tencent_minute(&http)
        .fetch(fetch_request("sz000001", "", 3, "1m"))
        .await
        .expect_err("quote missing");
    assert_eq!(error.kind(), SourceErrorKind::Parse);
}

#[test]
fn sina_urls_carry_scale_and_over_fetch() {
    let http = ScriptedHttpClient::new();
    let adapter = sina(&http);

    // Three calendar days back from 2024-03-08.
    assert_eq!(
        adapter.request_url(&fetch_request("sh000001", "2024-03-05", 2, "1d")),
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=5")
    );
    // 29 days / 4 -> 7 extra weeks.
    assert_eq!(
        adapter.request_url(&fetch_request("sh000001", "2024-02-08", 4, "1w")),
        format!("{SINA}?symbol=sh000001&scale=1200&ma=5&datalen=11")
    );
    // 68 days / 29 -> 2 extra months.
    assert_eq!(
        adapter.request_url(&fetch_request("sh000001", "2023-12-31", 3, "1M")),
        format!("{SINA}?symbol=sh000001&scale=7200&ma=5&datalen=5")
    );
    assert_eq!(
        adapter.request_url(&fetch_request("sh000001", "", 7, "1d")),
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=7")
    );
}

#[test]
fn sina_future_end_date_adds_nothing() {
    let http = ScriptedHttpClient::new();
    assert_eq!(
        sina(&http).request_url(&fetch_request("sh000001", "2024-04-01", 5, "1d")),
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=5")
    );
}

#[test]
fn sina_intraday_ignores_end_date() {
    let http = ScriptedHttpClient::new();
    assert_eq!(
        sina(&http).request_url(&fetch_request("000001.XSHE", "2024-01-02", 48, "15m")),
        format!("{SINA}?symbol=sz000001&scale=15&ma=5&datalen=48")
    );
}

#[tokio::test]
async fn sina_trims_bars_after_end_date() {
    let http = ScriptedHttpClient::new();
    http.respond_json(
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=5"),
        &sina_daily_payload(),
    );

    let series = sina(&http)
        .fetch(fetch_request("000001.XSHG", "2024-03-05", 2, "1d"))
        .await
        .expect("sina series");

    let times = series
        .bars()
        .iter()
        .map(|bar| bar.timestamp)
        .collect::<Vec<_>>();
    assert_eq!(
        times,
        vec![datetime!(2024-03-04 00:00), datetime!(2024-03-05 00:00)]
    );
    assert_eq!(series.bars()[1].close, 10.4);
}

#[tokio::test]
async fn sina_keeps_the_latest_bars_up_to_end_date() {
    let http = ScriptedHttpClient::new();
    http.respond_json(
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=3"),
        &sina_daily_payload(),
    );

    let series = sina(&http)
        .fetch(fetch_request("sh000001", "2024-03-07", 2, "1d"))
        .await
        .expect("sina series");

    let times = series
        .bars()
        .iter()
        .map(|bar| bar.timestamp)
        .collect::<Vec<_>>();
    assert_eq!(
        times,
        vec![datetime!(2024-03-06 00:00), datetime!(2024-03-07 00:00)]
    );
}

#[tokio::test]
async fn sina_bounded_fetch_is_short_when_few_bars_precede_end_date() {
    let http = ScriptedHttpClient::new();
    let url = format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=13");
    http.respond_json(&url, &sina_daily_payload());

    let series = sina(&http)
        .fetch(fetch_request("sh000001", "2024-03-05", 10, "1d"))
        .await
        .expect("sina series");

    assert_eq!(http.requested_urls(), vec![url]);
    let times = series
        .bars()
        .iter()
        .map(|bar| bar.timestamp)
        .collect::<Vec<_>>();
    assert_eq!(
        times,
        vec![datetime!(2024-03-04 00:00), datetime!(2024-03-05 00:00)]
    );
}

#[tokio::test]
async fn sina_returns_what_is_available_when_short() {
    let http = ScriptedHttpClient::new();
    http.respond_json(
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=10"),
        &sina_daily_payload(),
    );

    let series = sina(&http)
        .fetch(fetch_request("sh000001", "", 10, "1d"))
        .await
        .expect("sina series");
    assert_eq!(series.len(), 5);
}

#[tokio::test]
async fn sina_null_body_is_empty_result() {
    let http = ScriptedHttpClient::new();
    http.respond(
        format!("{SINA}?symbol=sh999999&scale=240&ma=5&datalen=3"),
        200,
        "null",
    );

    let error = sina(&http)
        .fetch(fetch_request("sh999999", "", 3, "1d"))
        .await
        .expect_err("no data");
    assert_eq!(error.kind(), SourceErrorKind::EmptyResult);
}

#[tokio::test]
async fn sina_malformed_body_is_parse_error() {
    let http = ScriptedHttpClient::new();
    http.respond(
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=3"),
        200,
        "<html>busy</html>",
    );

    let error = sina(&http)
        .fetch(fetch_request("sh000001", "", 3, "1d"))
        .await
        .expect_err("not json");
    assert_eq!(error.kind(), SourceErrorKind::Parse);
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let http = ScriptedHttpClient::new();
    http.respond(
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=3"),
        500,
        "",
    );
    http.fail(format!("{TENCENT_DAY}?param=sh000001,day,,,3,qfq"), "timed out");

    let sina_error = sina(&http)
        .fetch(fetch_request("sh000001", "", 3, "1d"))
        .await
        .expect_err("500");
    assert_eq!(sina_error.kind(), SourceErrorKind::Transport);

    let day_error = tencent_day(&http)
        .fetch(fetch_request("sh000001", "", 3, "1d"))
        .await
        .expect_err("timeout");
    assert_eq!(day_error.kind(), SourceErrorKind::Transport);
}

#[tokio::test]
async fn adapters_apply_configured_timeout() {
    let http = ScriptedHttpClient::new();
    http.respond_json(
        format!("{SINA}?symbol=sh000001&scale=240&ma=5&datalen=3"),
        &sina_daily_payload(),
    );

    sina(&http)
        .with_timeout_ms(2_500)
        .fetch(fetch_request("sh000001", "", 3, "1d"))
        .await
        .expect("sina series");

    assert_eq!(http.requests()[0].timeout_ms, 2_500);
}
