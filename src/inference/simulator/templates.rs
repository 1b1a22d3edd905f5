//! Canned file bodies for the simulator. Data only; selected by
//! [`ComponentKind`].

use super::prompt::{ComponentKind, ComponentSpec};

const COMPONENT_PLACEHOLDER: &str = "__COMPONENT__";

/// A component body and the one edit applied to it in the enhance step.
/// `edit_old` occurs exactly once in `body`.
#[derive(Debug)]
pub struct ComponentTemplate {
    pub body: &'static str,
    pub edit_old: &'static str,
    pub edit_new: &'static str,
    /// Entry file to use instead of the generic one.
    pub entry: Option<&'static str>,
}

pub fn component(kind: ComponentKind) -> &'static ComponentTemplate {
    match kind {
        ComponentKind::Form => &FORM,
        ComponentKind::Card => &CARD,
        ComponentKind::Counter => &COUNTER,
    }
}

/// Entry file that imports and renders the component.
pub fn entry_file(spec: &ComponentSpec) -> String {
    match component(spec.kind).entry {
        Some(entry) => entry.to_string(),
        None => ENTRY.replace(COMPONENT_PLACEHOLDER, spec.name),
    }
}

const ENTRY: &str = r#"import __COMPONENT__ from '@/components/__COMPONENT__';

export default function App() {
  return (
    <div className="min-h-screen bg-gradient-to-br from-slate-50 via-white to-indigo-50 flex items-center justify-center p-8">
      <div className="w-full max-w-md">
        <__COMPONENT__ />
      </div>
    </div>
  );
}"#;

static FORM: ComponentTemplate = ComponentTemplate {
    body: r#"import React, { useState } from 'react';

const ContactForm = () => {
  const [formData, setFormData] = useState({
    name: '',
    email: '',
    message: ''
  });
  const [focused, setFocused] = useState(null);

  const handleChange = (e) => {
    setFormData({
      ...formData,
      [e.target.name]: e.target.value
    });
  };

  const handleSubmit = (e) => {
    e.preventDefault();
    console.log('Form submitted:', formData);
  };

  return (
    <div className="max-w-md mx-auto">
      <div className="bg-white/80 backdrop-blur-xl rounded-3xl shadow-2xl shadow-indigo-500/10 border border-white/20 overflow-hidden">
        <div className="h-1.5 bg-gradient-to-r from-violet-500 via-indigo-500 to-cyan-500" />
        <div className="pt-10 pb-8 px-8">
          <h2 className="text-2xl font-bold tracking-tight text-slate-900 mb-1">Get in touch</h2>
          <p className="text-sm text-slate-500 mb-8">We'd love to hear from you. Fill out the form below.</p>
          <form onSubmit={handleSubmit} className="space-y-5">
            <div>
              <label htmlFor="name" className="block text-xs font-semibold uppercase tracking-wider text-slate-400 mb-2">
                Name
              </label>
              <input
                type="text"
                id="name"
                name="name"
                value={formData.name}
                onChange={handleChange}
                onFocus={() => setFocused('name')}
                onBlur={() => setFocused(null)}
                required
                className="w-full px-4 py-3 bg-slate-50 border-2 border-transparent rounded-xl text-slate-900 placeholder-slate-300 focus:outline-none focus:border-indigo-500 focus:bg-white focus:ring-4 focus:ring-indigo-500/10 transition-all duration-200"
                placeholder="Jane Doe"
              />
            </div>

            <div>
              <label htmlFor="email" className="block text-xs font-semibold uppercase tracking-wider text-slate-400 mb-2">
                Email
              </label>
              <input
                type="email"
                id="email"
                name="email"
                value={formData.email}
                onChange={handleChange}
                onFocus={() => setFocused('email')}
                onBlur={() => setFocused(null)}
                required
                className="w-full px-4 py-3 bg-slate-50 border-2 border-transparent rounded-xl text-slate-900 placeholder-slate-300 focus:outline-none focus:border-indigo-500 focus:bg-white focus:ring-4 focus:ring-indigo-500/10 transition-all duration-200"
                placeholder="jane@example.com"
              />
            </div>

            <div>
              <label htmlFor="message" className="block text-xs font-semibold uppercase tracking-wider text-slate-400 mb-2">
                Message
              </label>
              <textarea
                id="message"
                name="message"
                value={formData.message}
                onChange={handleChange}
                onFocus={() => setFocused('message')}
                onBlur={() => setFocused(null)}
                required
                rows={4}
                className="w-full px-4 py-3 bg-slate-50 border-2 border-transparent rounded-xl text-slate-900 placeholder-slate-300 focus:outline-none focus:border-indigo-500 focus:bg-white focus:ring-4 focus:ring-indigo-500/10 transition-all duration-200 resize-none"
                placeholder="Tell us what you're thinking..."
              />
            </div>

            <button
              type="submit"
              className="w-full bg-gradient-to-r from-indigo-600 to-violet-600 text-white py-3.5 px-6 rounded-xl font-semibold hover:from-indigo-500 hover:to-violet-500 active:scale-[0.98] transition-all duration-200 shadow-lg shadow-indigo-500/25 hover:shadow-xl hover:shadow-indigo-500/30"
            >
              Send Message
            </button>
          </form>
        </div>
      </div>
    </div>
  );
};

export default ContactForm;"#,
    edit_old: "    console.log('Form submitted:', formData);",
    edit_new: "    console.log('Form submitted:', formData);\n    setFormData({ name: '', email: '', message: '' });",
    entry: None,
};

static CARD: ComponentTemplate = ComponentTemplate {
    body: r#"import React from 'react';

const Card = ({
  title = "Welcome to Our Service",
  description = "Discover amazing features and capabilities that will transform your experience.",
  imageUrl,
  actions
}) => {
  return (
    <div className="group relative bg-white/80 backdrop-blur-xl rounded-3xl shadow-xl shadow-slate-900/5 border border-white/20 overflow-hidden hover:shadow-2xl hover:shadow-indigo-500/10 hover:-translate-y-1 transition-all duration-300">
      <div className="absolute inset-x-0 top-0 h-1 bg-gradient-to-r from-indigo-500 via-purple-500 to-pink-500" />
      {imageUrl && (
        <img
          src={imageUrl}
          alt={title}
          className="w-full h-52 object-cover"
        />
      )}
      <div className="pt-8 pb-7 px-8">
        <h3 className="text-xl font-bold tracking-tight text-slate-900 mb-2">{title}</h3>
        <p className="text-slate-500 leading-relaxed mb-6">{description}</p>
        {actions && (
          <div className="pt-2">
            {actions}
          </div>
        )}
      </div>
    </div>
  );
};

export default Card;"#,
    edit_old: r#"      <div className="pt-8 pb-7 px-8">"#,
    edit_new: r#"      <div className="pt-8 pb-7 px-8 relative">"#,
    entry: Some(CARD_ENTRY),
};

const CARD_ENTRY: &str = r#"import Card from '@/components/Card';

export default function App() {
  return (
    <div className="min-h-screen bg-gradient-to-br from-slate-50 via-white to-indigo-50 flex items-center justify-center p-8">
      <div className="w-full max-w-md">
        <Card
          title="Amazing Product"
          description="This is a fantastic product that will change your life. Experience the difference today!"
          actions={
            <button className="inline-flex items-center gap-2 bg-gradient-to-r from-indigo-600 to-violet-600 text-white px-6 py-2.5 rounded-xl font-semibold hover:from-indigo-500 hover:to-violet-500 active:scale-95 transition-all duration-200 shadow-lg shadow-indigo-500/25">
              Learn More
              <svg className="w-4 h-4" fill="none" viewBox="0 0 24 24" stroke="currentColor"><path strokeLinecap="round" strokeLinejoin="round" strokeWidth={2} d="M17 8l4 4m0 0l-4 4m4-4H3" /></svg>
            </button>
          }
        />
      </div>
    </div>
  );
}"#;

static COUNTER: ComponentTemplate = ComponentTemplate {
    body: r#"import { useState } from 'react';

const Counter = () => {
  const [count, setCount] = useState(0);

  const increment = () => setCount(prev => prev + 1);
  const decrement = () => setCount(prev => prev - 1);
  const reset = () => setCount(0);

  return (
    <div className="relative bg-white/80 backdrop-blur-xl rounded-3xl shadow-2xl shadow-slate-900/5 border border-white/20 overflow-hidden">
      <div className="h-1.5 bg-gradient-to-r from-emerald-400 via-cyan-500 to-indigo-500" />
      <div className="pt-10 pb-8 px-10">
        <p className="text-xs font-semibold uppercase tracking-widest text-slate-400 mb-2">Live Counter</p>
        <h2 className="text-2xl font-bold tracking-tight text-slate-900 mb-8">Keep track of anything</h2>
        <div className="flex items-center justify-center mb-10">
          <div className="text-7xl font-black tabular-nums bg-gradient-to-br from-indigo-600 to-violet-600 bg-clip-text text-transparent">
            {count}
          </div>
        </div>
        <div className="flex gap-3">
          <button
            onClick={decrement}
            className="flex-1 px-5 py-3 bg-slate-100 text-slate-700 font-semibold rounded-2xl hover:bg-rose-50 hover:text-rose-600 active:scale-95 transition-all duration-200"
          >
            - Decrease
          </button>
          <button
            onClick={reset}
            className="px-5 py-3 bg-slate-100 text-slate-400 font-semibold rounded-2xl hover:bg-slate-200 hover:text-slate-600 active:scale-95 transition-all duration-200"
          >
            Reset
          </button>
          <button
            onClick={increment}
            className="flex-1 px-5 py-3 bg-gradient-to-r from-indigo-600 to-violet-600 text-white font-semibold rounded-2xl hover:from-indigo-500 hover:to-violet-500 active:scale-95 transition-all duration-200 shadow-lg shadow-indigo-500/25"
          >
            + Increase
          </button>
        </div>
      </div>
    </div>
  );
};

export default Counter;"#,
    edit_old: r#"        <p className="text-xs font-semibold uppercase tracking-widest text-slate-400 mb-2">Live Counter</p>"#,
    edit_new: r#"        <p className="text-xs font-semibold uppercase tracking-widest text-indigo-400 mb-2">Live Counter</p>"#,
    entry: None,
};
