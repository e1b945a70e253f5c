//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use crate::catalog::CatalogStore;

/// テスト用のカタログ文書を作成する
///
/// # Arguments
/// * `language` - `language` 属性の値（例: "pl", "pt_BR"）
/// * `body` - `<TS>` 要素の中身
///
/// # Returns
/// `<message>` は 6 行目から始まる完全な .ts 文書
pub(crate) fn ts_document(language: &str, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\" language=\"{language}\" sourcelanguage=\"en\">{body}\n</TS>\n"
    )
}

/// 1 件のメッセージだけを持つ `<context>` を作成する
///
/// `comment` が空の場合は `<comment>` 要素を出力しない
pub(crate) fn message(context: &str, source: &str, translation: &str, comment: &str) -> String {
    let comment =
        if comment.is_empty() { String::new() } else { format!("<comment>{comment}</comment>") };
    format!(
        "\n<context><name>{context}</name><message><source>{source}</source>{comment}<translation>{translation}</translation></message></context>"
    )
}

/// 1 件の複数形メッセージだけを持つ `<context>` を作成する
pub(crate) fn numerus_message(context: &str, source: &str, forms: &[&str]) -> String {
    let forms: String =
        forms.iter().map(|form| format!("<numerusform>{form}</numerusform>")).collect();
    format!(
        "\n<context><name>{context}</name><message numerus=\"yes\"><source>{source}</source><translation>{forms}</translation></message></context>"
    )
}

/// テスト用の CatalogStore を作成する
///
/// # Panics
/// 文書が不正な場合
pub(crate) fn create_store(language: &str, body: &str) -> CatalogStore {
    CatalogStore::from_bytes(ts_document(language, body).as_bytes()).unwrap()
}
