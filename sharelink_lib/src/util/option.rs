use serde::Deserialize;

/// Field that persisted configs store either as a bare value or as a list
/// of values, with missing and null both accepted.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NoneOrSome<T> {
    #[serde(skip_deserializing)]
    #[default]
    Unspecified,
    None,
    One(T),
    Some(Vec<T>),
}

impl<T> NoneOrSome<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            NoneOrSome::Unspecified | NoneOrSome::None => None,
            NoneOrSome::One(item) => Some(item),
            NoneOrSome::Some(v) => v.first(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            NoneOrSome::Unspecified | NoneOrSome::None => true,
            NoneOrSome::One(_) => false,
            NoneOrSome::Some(v) => v.is_empty(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            NoneOrSome::Unspecified | NoneOrSome::None => vec![],
            NoneOrSome::One(item) => vec![item],
            NoneOrSome::Some(v) => v,
        }
    }
}
