use crate::{data_formats::PostPageWrapper, errors::RequestError, PostResponse};

/// A resolved page window over a listing of `count` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
    pub count: i64,
    pub num_pages: i64,
}

impl Page {
    /// Resolves the raw `page` query value. Missing means the first page; anything that
    /// is not a page number of this listing is a 404. The first page always exists.
    pub fn resolve(raw: Option<&str>, count: i64, size: i64) -> Result<Self, RequestError> {
        let num_pages = if count <= 0 {
            1
        } else {
            (count + size - 1) / size
        };
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(value) => value.parse::<i64>().map_err(|_| RequestError::NotFound)?,
        };
        if number < 1 || number > num_pages {
            return Err(RequestError::NotFound);
        }
        Ok(Page {
            number,
            size,
            count,
            num_pages,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn wrap(self, posts: Vec<PostResponse>) -> PostPageWrapper {
        PostPageWrapper {
            posts,
            posts_count: self.count,
            page: self.number,
            num_pages: self.num_pages,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }
}
