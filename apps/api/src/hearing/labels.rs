//! Display-label and headcount lookup tables.
//!
//! Unknown tokens pass through unchanged; lookups never fail.

pub const GROUP_TYPE_LABELS: &[(&str, &str)] = &[
    ("solo", "1人（一人旅）"),
    ("couple", "2人（カップル・夫婦）"),
    ("family", "3-4人（家族）"),
    ("friends", "3-6人（友人グループ）"),
    ("large_group", "7人以上"),
];

pub const TRANSPORTATION_LABELS: &[(&str, &str)] = &[
    ("train", "電車・新幹線"),
    ("car", "車"),
    ("bus", "高速バス"),
    ("plane", "飛行機"),
    ("mixed", "組み合わせ"),
    ("any", "お任せ"),
];

pub const INTEREST_LABELS: &[(&str, &str)] = &[
    ("sightseeing", "観光・名所巡り"),
    ("gourmet", "グルメ・食べ歩き"),
    ("onsen", "温泉・リラクゼーション"),
    ("nature", "自然・アウトドア"),
    ("culture", "歴史・文化体験"),
    ("shopping", "ショッピング"),
    ("nightlife", "夜景・ナイトライフ"),
    ("photography", "写真・インスタ映え"),
];

/// Policy headcount per group type. A stand-in for an unknown exact count.
pub const GROUP_HEADCOUNTS: &[(&str, u32)] = &[
    ("solo", 1),
    ("couple", 2),
    ("family", 4),
    ("friends", 5),
    ("large_group", 8),
];

/// Looks up the display label for `token`, returning the token itself when unmapped.
pub fn label_for<'a>(table: &[(&str, &'a str)], token: &'a str) -> &'a str {
    table
        .iter()
        .find(|(key, _)| *key == token)
        .map(|(_, label)| *label)
        .unwrap_or(token)
}

pub fn headcount_for(group_type: &str) -> Option<u32> {
    GROUP_HEADCOUNTS
        .iter()
        .find(|(key, _)| *key == group_type)
        .map(|(_, n)| *n)
}
