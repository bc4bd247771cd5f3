use crate::value::Value;

/// Every element of every list observed at one path, in corpus order.
#[derive(Clone, Debug, Default)]
pub struct ListItems<'a> {
    pub items: Vec<&'a Value>,
    pub lists: usize,
}

impl<'a> ListItems<'a> {
    pub fn collect<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<Value>>,
    {
        let mut out = Self::default();
        for xs in lists {
            out.lists += 1;
            out.items.extend(xs.iter());
        }
        out
    }
}
