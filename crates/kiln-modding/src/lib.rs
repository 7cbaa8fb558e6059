use std::marker::PhantomData;

use anyhow::anyhow;
use reqwest::Client;
use serde::de::DeserializeOwned;

pub mod modrinth;

pub use modrinth::registry::ModrinthRegistry;

pub struct Query<Data, T>
where
    Data: QueryData<T>,
{
    data: Data,
    base_url: String,
    _marker: PhantomData<T>,
}

impl<Data, T> Query<Data, T>
where
    Data: QueryData<T>,
    T: DeserializeOwned,
{
    pub fn new(data: Data) -> Self {
        Self {
            data,
            base_url: kiln_core::MODRINTH_API_URL.to_owned(),
            _marker: PhantomData,
        }
    }

    /// Sends the query to another API root than the public one.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn url(&self) -> String {
        self.data.builder(self.base_url.trim_end_matches('/')).build()
    }

    pub async fn query(&self, client: &Client) -> anyhow::Result<T> {
        let url = self.url();
        tracing::debug!(url, "Querying");

        let s = client.get(&url).send().await?.error_for_status()?.text().await?;

        let mut deserializer = serde_json::Deserializer::from_str(&s);

        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            let path = e.path().to_string();
            anyhow!("Path: {}. Error: {}", path, e.into_inner())
        })
    }
}

pub trait QueryData<T> {
    /// Build the url relative to `base_url`.
    fn builder(&self, base_url: &str) -> Builder;
}

pub struct Builder {
    base_url: String,
    data: Vec<String>,
}

impl Builder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            data: Vec::new(),
        }
    }

    fn check_and_add_symbol(&mut self) {
        if self.data.is_empty() {
            self.data.push("?".to_owned());
        } else {
            self.data.push("&".to_owned());
        }
    }

    pub fn add_optional_parameter(mut self, name: impl Into<String>, param: Option<impl Into<String>>) -> Self {
        if let Some(param) = param.map(Into::into) {
            self.check_and_add_symbol();
            self.data.push(format!("{}={}", name.into(), urlencoding::encode(&param)));
        }
        self
    }

    pub fn add_parameter(self, name: impl Into<String>, param: impl Into<String>) -> Self {
        self.add_optional_parameter(name, Some(param))
    }

    pub fn build(&self) -> String {
        format!("{}{}", self.base_url, self.data.join(""))
    }
}

pub(crate) fn format_list(value: impl Iterator<Item = impl Into<String>>) -> String {
    let iter = value.map(|s| format!("\"{}\"", s.into()));
    let s = itertools::intersperse(iter, ",".to_owned()).collect::<String>();
    format!("[{s}]")
}
