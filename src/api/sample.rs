use axum::http::header;
use axum::response::IntoResponse;

pub const TEMPLATE_CSV: &str = "\
TradeDate,Scrip,Action,Quantity,Price,Brokerage,Charges,STT,Exchange,ISIN,Notes
2023-01-01,TCS,BUY,100,3000,10,5,0,NSE,INE467B01029,Initial buy
2023-03-01,TCS,BUY,50,3200,10,5,0,NSE,INE467B01029,Additional buy
2023-06-15,TCS,SELL,80,3300,12,6,3,NSE,INE467B01029,Partial sell
2024-01-10,TCS,SELL,30,3400,12,6,3,NSE,INE467B01029,Another sell
";

pub async fn template_csv() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=sample_template.csv",
            ),
        ],
        TEMPLATE_CSV,
    )
}
