/// Mean star rating, `None` when nothing has been rated.
pub fn average_rating<I>(stars: I) -> Option<f64>
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = stars
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), star| (sum + u64::from(star), count + 1));

    (count > 0).then(|| sum as f64 / count as f64)
}
