pub mod http_object_storage;
