#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const DATASET_NAME: &str = "project1 - preprocessed_data.csv";

/// Source headers in the layout the default configuration expects.
pub const HEADER: &str = "주문번호,주문일,셀러명,품종,주문경로,광역지역(정식),재구매 횟수,회원구분,실결제 금액,결제금액";

/// One source row. Amounts are written quoted so `"12,000"` keeps its separator.
#[derive(Clone)]
pub struct Order {
    pub id: &'static str,
    pub ordered_at: &'static str,
    pub seller: &'static str,
    pub variety: &'static str,
    pub channel: &'static str,
    pub region: &'static str,
    pub repeat: u32,
    pub membership: &'static str,
    pub amount: &'static str,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            id: "1",
            ordered_at: "2024-03-01 09:00:00",
            seller: "A",
            variety: "감귤",
            channel: "네이버",
            region: "서울특별시",
            repeat: 0,
            membership: "회원",
            amount: "10,000",
        }
    }
}

impl Order {
    fn line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},\"{}\",\"{}\"",
            self.id,
            self.ordered_at,
            self.seller,
            self.variety,
            self.channel,
            self.region,
            self.repeat,
            self.membership,
            self.amount,
            self.amount
        )
    }
}

/// Write `orders` under `dir` with the default dataset file name.
pub fn write_dataset(dir: &Path, orders: &[Order]) -> PathBuf {
    let mut content = String::from(HEADER);
    content.push('\n');
    for order in orders {
        content.push_str(&order.line());
        content.push('\n');
    }
    let path = dir.join(DATASET_NAME);
    fs::write(&path, content).unwrap();
    path
}

/// Seller "A" (10,000, first purchase) and the reserved seller (30,000, repeat buyer).
pub fn two_orders() -> Vec<Order> {
    vec![
        Order {
            id: "1",
            seller: "A",
            amount: "10,000",
            repeat: 0,
            ..Default::default()
        },
        Order {
            id: "2",
            ordered_at: "2024-03-02 14:30:00",
            seller: "킹댕즈",
            amount: "30,000",
            repeat: 1,
            channel: "기타",
            region: "부산광역시",
            membership: "비회원",
            ..Default::default()
        },
    ]
}

/// A few days of orders spread over channels, regions and both seller groups.
pub fn sample_orders() -> Vec<Order> {
    vec![
        Order {
            id: "100",
            ordered_at: "2024-03-01 08:10:00",
            seller: "킹댕즈",
            channel: "크롬",
            region: "서울특별시",
            amount: "25,000",
            repeat: 2,
            ..Default::default()
        },
        Order {
            id: "101",
            ordered_at: "2024-03-01 11:45:00",
            seller: "B",
            variety: "한라봉",
            channel: "기타",
            region: "서울특별시",
            amount: "18,500",
            membership: "비회원",
            ..Default::default()
        },
        Order {
            id: "102",
            ordered_at: "2024-03-02 19:00:00",
            seller: "C",
            variety: "천혜향",
            channel: "크롬",
            region: "부산광역시",
            amount: "42,000",
            repeat: 1,
            ..Default::default()
        },
        Order {
            id: "103",
            ordered_at: "2024-03-03 07:20:00",
            seller: "킹댕즈",
            variety: "한라봉",
            channel: "네이버",
            region: "제주특별자치도",
            amount: "12,000",
            ..Default::default()
        },
        Order {
            id: "104",
            ordered_at: "2024-03-03 21:05:00",
            seller: "B",
            channel: "기타",
            region: "부산광역시",
            amount: "9,900",
            repeat: 3,
            ..Default::default()
        },
    ]
}
