//! Core data types exchanged between the provider, the wire, and callers.

mod params;
mod record;
mod request;
mod response;
mod value;

pub use bytes::Bytes;
pub use params::{
    CreateParams, DeleteManyParams, DeleteParams, FilterSpec, GetListParams, GetManyParams,
    GetManyReferenceParams, GetOneParams, ListResult, Pagination, PaginationInfo, Sort,
    SortOrder, UpdateManyParams, UpdateParams,
};
pub use record::Record;
pub use request::{FormPart, FormValue, HydraRequest, RequestBody};
pub use response::HydraResponse;
pub use value::{DataValue, Payload, RawFile};
