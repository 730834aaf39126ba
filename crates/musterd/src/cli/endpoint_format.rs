use clap::ValueEnum;
use muster_tracker::EndpointFormat;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum EndpointFormatArg {
    Ip,
    Url,
}

impl EndpointFormatArg {
    #[must_use]
    pub fn into_format(self, scheme: String) -> EndpointFormat {
        match self {
            Self::Ip => EndpointFormat::Ip,
            Self::Url => EndpointFormat::Url { scheme },
        }
    }
}
