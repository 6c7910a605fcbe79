//! 🧪 Shared test pages. Two shifts, five children, one recurring cast of UUIDs.

use serde_json::{Value, json};

pub(crate) const SHIFT_A: &str = "b2b9437a-28df-4ec4-8e4a-2bbdc241330b";
pub(crate) const SHIFT_B: &str = "d453dd32-4b0d-4b41-8d52-88f1142c3fe8";
pub(crate) const BREAK_A: &str = "16419f82-8b9d-4434-a465-e150bd9c66b3";

/// 🗓️ Shift A: 2023-11-27, one unpaid break, three allowances (44.4), no awards.
pub(crate) fn shift_a() -> Value {
    json!({
        "id": SHIFT_A,
        "date": "2023-11-27",
        "start": 1701077400000_i64,
        "finish": 1701108900000_i64,
        "breaks": [
            { "id": BREAK_A, "start": 1701085620000_i64, "finish": 1701087005277_i64, "paid": false }
        ],
        "allowances": [
            { "id": "815ef6d1-3b8f-4a18-b7f8-a88b17fc695a", "value": 0.5, "cost": 2.5 },
            { "id": "b38a088c-a65e-4389-b74d-0fb132e70629", "value": 0.5, "cost": 29.7 },
            { "id": "cf36d58b-4737-4190-96da-1dac72ff5d2a", "value": 1.5, "cost": 12.2 }
        ],
        "award_interpretations": []
    })
}

/// 🗓️ Shift B: 2023-11-28, one paid break, no allowances, two awards (118.7).
pub(crate) fn shift_b() -> Value {
    json!({
        "id": SHIFT_B,
        "date": "2023-11-28",
        "start": 1701160200000_i64,
        "finish": 1701198000000_i64,
        "breaks": [
            { "id": "6142ea7d-17be-4111-9a2a-73ed562b0f79", "start": 1701168180000_i64, "finish": 1701169724388_i64, "paid": true }
        ],
        "allowances": [],
        "award_interpretations": [
            { "id": "bacfb3d0-0b1f-4163-8e9f-f57f43b7a3a6", "date": "2023-11-28", "units": 1.0, "cost": 62.8 },
            { "id": "60e7a113-ec1b-4ca1-b91e-1d4c1ff49b78", "date": "2023-11-28", "units": 1.5, "cost": 55.9 }
        ]
    })
}

/// 📦 Both shifts on a single page, no links. The one-and-done page.
pub(crate) fn the_two_shift_page() -> Value {
    json!({ "results": [shift_a(), shift_b()] })
}

/// 🔗 A page body wrapping the given shifts plus whatever `links` object you hand it.
pub(crate) fn page_with_links(results: Vec<Value>, links: Value) -> Value {
    json!({ "results": results, "links": links, "start": 0, "limit": 1, "size": 1 })
}

/// 🗓️ A bare shift: no timestamps, no money, optionally one break. For the KPI grouping tests.
pub(crate) fn bare_shift(id: &str, date: &str, with_break: bool) -> Value {
    let breaks = if with_break {
        json!([{ "id": format!("{id}-break"), "paid": false }])
    } else {
        json!([])
    };
    json!({ "id": id, "date": date, "breaks": breaks, "allowances": [], "award_interpretations": [] })
}
