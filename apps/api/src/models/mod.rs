pub mod testimonial;
