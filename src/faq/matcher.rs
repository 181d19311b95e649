//! 模糊匹配：未命中命令时给出"你是不是想找"候选
//!
//! 相似度采用最长匹配块比值：2 * 匹配字符数 / (两串长度和)。
//! 阈值随查询变短而收紧：min(0.8, 1 - 1/len)，长查询封顶 0.8，
//! 短查询要求更高占比，避免两三个字符几乎匹配一切。

/// 对候选集合逐个判定是否足够接近查询串
///
/// 结果去重、保持候选迭代顺序。查询不足 2 个字符时直接返回空
/// （区分度太低，不值得打扰用户）。
pub fn suggest<I>(query: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let query_len = query.chars().count();
    if query_len < 2 {
        return Vec::new();
    }
    let threshold = 0.8_f64.min(1.0 - 1.0 / query_len as f64);

    let mut matches = Vec::new();
    for candidate in candidates {
        if matches.contains(&candidate) {
            continue;
        }
        if candidate.contains(query) || similarity_ratio(query, &candidate) > threshold {
            matches.push(candidate);
        }
    }
    matches
}

/// 序列相似度：2*M/(len_a+len_b)，M 为全部匹配块的字符总数
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    (2.0 * matched as f64) / ((a.len() + b.len()) as f64)
}

/// 递归分解：取最长公共子串为一个匹配块，再对两侧剩余区间继续取块
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (ai, bi, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..ai], &b[..bi]) + matching_chars(&a[ai + len..], &b[bi + len..])
}

/// O(n*m) 动态规划求最长公共子串，返回 (a 起点, b 起点, 长度)
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut row = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut prev = 0;
        for j in 0..b.len() {
            let diagonal = prev;
            prev = row[j + 1];
            row[j + 1] = if a[i] == b[j] { diagonal + 1 } else { 0 };
            if row[j + 1] > best.2 {
                best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
            }
        }
    }
    best
}
