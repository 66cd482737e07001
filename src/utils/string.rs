/// 首字母大写，其余小写，例如 `spotify` -> `Spotify`
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// 把连续空白折叠为单个 `-`，并替换路径分隔符
pub fn dash_join(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| word.replace(['/', '\\'], "_"))
        .collect::<Vec<_>>()
        .join("-")
}

/// 封面缓存文件名：`<标题>-<艺术家>.png`
pub fn thumbnail_file_name(title: &str, artist: &str) -> String {
    format!("{}-{}.png", dash_join(title), dash_join(artist))
}
