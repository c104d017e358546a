pub mod blkid;
pub mod dependencies;
pub mod findmnt;
pub mod lsblk;
pub mod tabfile;
