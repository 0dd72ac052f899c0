use crate::enrich::speed;
use crate::point::Point;

/// Lazily fold running totals into an enriched session, yielding every
/// intermediate state.
pub fn cumulate<I>(points: I) -> Cumulate<I::IntoIter>
where
    I: IntoIterator<Item = Point>,
{
    Cumulate {
        inner: points.into_iter(),
        acc: None,
    }
}

/// Iterator returned by [`cumulate`]. The first point passes through with
/// its zero totals; the fold cannot be split within a session.
pub struct Cumulate<I> {
    inner: I,
    acc: Option<Point>,
}

impl<I> Iterator for Cumulate<I>
where
    I: Iterator<Item = Point>,
{
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let point = self.inner.next()?;
        let folded = match self.acc {
            Some(prev) => accumulate(&prev, &point),
            None => point,
        };
        self.acc = Some(folded);
        Some(folded)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Totals of `next` given the accumulated predecessor `prev`. Descent sums
/// the negative elevation steps and so never grows above zero.
pub fn accumulate(prev: &Point, next: &Point) -> Point {
    let cumulative_distance = prev.cumulative_distance + next.distance;
    let cumulative_duration = prev.cumulative_duration + next.duration;
    let cumulative_descent = if next.elevation_diff < 0.0 {
        prev.cumulative_descent + next.elevation_diff
    } else {
        prev.cumulative_descent
    };
    let cumulative_ascent = if next.elevation_diff > 0.0 {
        prev.cumulative_ascent + next.elevation_diff
    } else {
        prev.cumulative_ascent
    };
    Point {
        cumulative_descent,
        cumulative_ascent,
        cumulative_distance,
        cumulative_duration,
        rolling_average_speed: speed(cumulative_distance, cumulative_duration),
        ..*next
    }
}
